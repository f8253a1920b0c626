use crate::signaling::SignalingOutput;
use airbeam_core::{PeerId, SignalingMessage};
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Live connections by peer id. Each entry is the unbounded queue drained by
/// that connection's send task; enqueueing never blocks the caller.
#[derive(Clone, Default)]
pub struct ClientChannels {
    peers: Arc<DashMap<PeerId, mpsc::UnboundedSender<Message>>>,
}

impl ClientChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }
}

impl SignalingOutput for ClientChannels {
    fn send_to(&self, peer_id: &PeerId, message: &SignalingMessage) {
        if let Some(peer) = self.peers.get(peer_id) {
            match serde_json::to_string(message) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to queue WS message for {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signaling message: {}", e),
            }
        } else {
            warn!(
                "Attempted to send '{}' to disconnected peer {}",
                message.kind(),
                peer_id
            );
        }
    }
}
