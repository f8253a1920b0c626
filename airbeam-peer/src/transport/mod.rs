mod memory;
mod transport_event;

pub use memory::*;
pub use transport_event::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
}

/// The established ordered reliable point-to-point channel, as far as the
/// transfer engine cares. A real implementation wraps a WebRTC data channel;
/// [`MemoryChannel`] backs the tests.
///
/// `send` is a synchronous ordered enqueue and never blocks; the cost of
/// sending faster than the network drains shows up in `buffered_amount`,
/// and `drained` is the one place a sender may suspend.
#[async_trait]
pub trait ChunkedTransport: Send + Sync {
    fn send(&self, frame: Frame) -> Result<(), TransportError>;

    /// Bytes queued but not yet flushed to the network.
    fn buffered_amount(&self) -> usize;

    /// Resolves once the outgoing buffer has fallen below the low-water
    /// threshold (or the transport died; the next `send` reports that).
    async fn drained(&self);

    fn close(&self);
}
