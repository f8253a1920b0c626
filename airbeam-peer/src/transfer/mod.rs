mod assembler;
mod chunker;
mod session;

pub use assembler::*;
pub use chunker::*;
pub use session::*;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("binary chunk received before file metadata")]
    OutOfOrderChunk,

    #[error("size mismatch: declared {declared} bytes, received {received}")]
    SizeMismatch { declared: u64, received: u64 },

    #[error("transport closed mid-transfer")]
    TransportClosed,

    #[error("transport error: {0}")]
    TransportFailed(String),

    #[error("codec error: {0}")]
    Codec(String),
}

impl From<crate::transport::TransportError> for TransferError {
    fn from(_: crate::transport::TransportError) -> Self {
        Self::TransportClosed
    }
}
