use crate::signaling::SignalingError;
use airbeam_core::SignalingMessage;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// One live connection to the relay: typed messages in, typed messages out.
/// The link is dead once `incoming` yields `None` (or `outgoing` errors).
pub struct SignalingLink {
    pub outgoing: mpsc::UnboundedSender<SignalingMessage>,
    pub incoming: mpsc::UnboundedReceiver<SignalingMessage>,
}

/// How the client obtains a fresh link; the reconnect loop calls this once
/// per attempt. Implemented for real WebSockets by [`WsConnector`] and by
/// an in-memory connector in the tests.
#[async_trait]
pub trait SignalingConnector: Send + Sync {
    async fn connect(&self) -> Result<SignalingLink, SignalingError>;
}

/// WebSocket connector against the relay's `/ws` endpoint.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SignalingConnector for WsConnector {
    async fn connect(&self) -> Result<SignalingLink, SignalingError> {
        let (ws, _) = connect_async(&self.url)
            .await
            .map_err(|e| SignalingError::ConnectFailed(e.to_string()))?;
        debug!("Signaling WebSocket connected: {}", self.url);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalingMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to serialize signaling message: {}", e),
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalingMessage>(&text) {
                            Ok(message) => {
                                if in_tx.send(message).is_err() {
                                    break;
                                }
                            }
                            // Malformed frames are dropped, never fatal.
                            Err(e) => warn!("Invalid message from relay: {:?}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        Ok(SignalingLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}
