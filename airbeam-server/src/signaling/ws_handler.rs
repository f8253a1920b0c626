use crate::relay::RelayCommand;
use crate::signaling::ClientChannels;
use airbeam_core::{Member, PeerId, SignalingMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Shared state handed to the axum router: the outbound channel map plus the
/// relay actor's command queue.
#[derive(Clone)]
pub struct AppState {
    pub channels: ClientChannels,
    pub relay_tx: mpsc::Sender<RelayCommand>,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    // Connection ids are minted here, never taken from the client.
    let peer_id = PeerId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, state))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, state: AppState) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.channels.add_peer(peer_id.clone(), tx);

    let member = Member::generated(peer_id.clone());
    if state
        .relay_tx
        .send(RelayCommand::Connect { member })
        .await
        .is_err()
    {
        error!("Relay is gone, dropping connection {}", peer_id);
        state.channels.remove_peer(&peer_id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay_tx = state.relay_tx.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalingMessage>(&text) {
                        Ok(message) => {
                            let cmd = RelayCommand::Message {
                                from: peer_id.clone(),
                                message,
                            };
                            if let Err(e) = relay_tx.send(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid message from {}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            let _ = relay_tx
                .send(RelayCommand::Disconnect {
                    peer_id: peer_id.clone(),
                })
                .await;
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Covers the abort path; leave_room is idempotent on the relay side.
    let _ = state
        .relay_tx
        .send(RelayCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await;

    state.channels.remove_peer(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
