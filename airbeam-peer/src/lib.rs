pub mod manager;
pub mod signaling;
pub mod transfer;
pub mod transport;

pub use manager::*;
pub use signaling::*;
pub use transfer::*;
pub use transport::*;
