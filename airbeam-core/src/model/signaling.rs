use crate::model::member::Member;
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every message exchanged between a client and the relay, tagged by `type`.
///
/// `sdp`, `candidate` and `payload` are opaque to the relay: they are carried
/// verbatim to the target peer and never interpreted. `from` on the routed
/// variants is always injected by the relay from the authenticated sender's
/// connection id; a value supplied by the client is overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalingMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        is_public: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },
    GetPublicRooms,
    Offer {
        to: PeerId,
        sdp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    Answer {
        to: PeerId,
        sdp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    IceCandidate {
        to: PeerId,
        candidate: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    Relay {
        to: PeerId,
        payload: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
    },
    Welcome {
        id: PeerId,
        username: String,
    },
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: RoomId,
        users: Vec<Member>,
    },
    UserListUpdate {
        users: Vec<Member>,
    },
    PublicRooms {
        rooms: Vec<RoomId>,
    },
    Error {
        message: String,
    },
}

impl SignalingMessage {
    /// Target peer of a routed peer-to-peer payload, `None` for everything else.
    pub fn target(&self) -> Option<&PeerId> {
        match self {
            Self::Offer { to, .. }
            | Self::Answer { to, .. }
            | Self::IceCandidate { to, .. }
            | Self::Relay { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Stamp the authenticated sender onto a routed payload.
    pub fn set_from(&mut self, sender: PeerId) {
        match self {
            Self::Offer { from, .. }
            | Self::Answer { from, .. }
            | Self::IceCandidate { from, .. }
            | Self::Relay { from, .. } => *from = Some(sender),
            _ => {}
        }
    }

    /// The wire tag, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create-room",
            Self::JoinRoom { .. } => "join-room",
            Self::GetPublicRooms => "get-public-rooms",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::Relay { .. } => "relay",
            Self::Welcome { .. } => "welcome",
            Self::RoomCreated { .. } => "room-created",
            Self::UserListUpdate { .. } => "user-list-update",
            Self::PublicRooms { .. } => "public-rooms",
            Self::Error { .. } => "error",
        }
    }
}
