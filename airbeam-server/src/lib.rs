pub mod relay;
pub mod room;
pub mod signaling;

pub use relay::*;
pub use room::*;
pub use signaling::*;
