use airbeam_core::{Member, PeerId, SignalingMessage};

/// Commands flowing from the connection tasks into the relay actor. One
/// bounded channel carries all of them, which is what serializes room
/// mutation across concurrent connections.
#[derive(Debug)]
pub enum RelayCommand {
    /// A WebSocket finished its handshake; the member's channel is already
    /// registered with the output before this is sent.
    Connect { member: Member },

    /// A parsed message from a connected client.
    Message {
        from: PeerId,
        message: SignalingMessage,
    },

    /// The connection dropped; membership cleanup must happen before any
    /// later command touches the same room.
    Disconnect { peer_id: PeerId },
}
