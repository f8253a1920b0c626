use airbeam_core::{PeerId, SignalingMessage};

/// Outbound side of the relay: how signaling messages leave the actor.
///
/// Implemented by [`ClientChannels`] over live WebSocket connections and by
/// a capturing mock in the tests. Sending is a synchronous enqueue so the
/// relay's broadcast never suspends inside its critical section; the actual
/// socket write happens in each connection's send task.
///
/// [`ClientChannels`]: crate::signaling::ClientChannels
pub trait SignalingOutput: Send + Sync {
    fn send_to(&self, peer_id: &PeerId, message: &SignalingMessage);
}
