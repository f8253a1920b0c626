mod client;
mod connector;

pub use client::*;
pub use connector::*;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalingError {
    #[error("failed to connect: {0}")]
    ConnectFailed(String),

    #[error("gave up after {attempts} reconnect attempts")]
    MaxReconnectAttemptsExceeded { attempts: u32 },
}
