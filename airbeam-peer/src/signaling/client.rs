use crate::signaling::{SignalingConnector, SignalingError, SignalingLink};
use airbeam_core::SignalingMessage;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Bounded automatic reconnection: after this many failed attempts the
/// condition is reported once and never retried.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Base delay between attempts; the n-th retry waits n times this.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum ClientEvent {
    Connected,
    Message(SignalingMessage),
    /// Terminal: the reconnect cap is exhausted.
    Failed(SignalingError),
}

/// Sender half handed to the application. Messages sent while the link is
/// down are queued and flushed in order on reconnect.
#[derive(Clone)]
pub struct ClientHandle {
    tx: mpsc::UnboundedSender<SignalingMessage>,
}

impl ClientHandle {
    pub fn send(&self, message: SignalingMessage) {
        if self.tx.send(message).is_err() {
            warn!("Signaling client task is gone");
        }
    }
}

/// Client half of the signaling link with automatic, bounded reconnect.
pub struct SignalingClient {
    connector: Arc<dyn SignalingConnector>,
    user_rx: mpsc::UnboundedReceiver<SignalingMessage>,
    events: mpsc::UnboundedSender<ClientEvent>,
    /// Messages that failed mid-send and must go out first on reconnect.
    pending: VecDeque<SignalingMessage>,
}

impl SignalingClient {
    pub fn spawn(
        connector: Arc<dyn SignalingConnector>,
    ) -> (ClientHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (user_tx, user_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let client = Self {
            connector,
            user_rx,
            events: event_tx,
            pending: VecDeque::new(),
        };
        tokio::spawn(client.run());

        (ClientHandle { tx: user_tx }, event_rx)
    }

    pub async fn run(mut self) {
        let mut attempts: u32 = 0;

        loop {
            match self.connector.connect().await {
                Ok(link) => {
                    attempts = 0;
                    info!("Signaling link established");
                    let _ = self.events.send(ClientEvent::Connected);
                    if !self.pump(link).await {
                        return;
                    }
                    debug!("Signaling link severed");
                }
                Err(e) => debug!("Signaling connect failed: {}", e),
            }

            attempts += 1;
            if attempts > MAX_RECONNECT_ATTEMPTS {
                warn!("Giving up after {} reconnect attempts", MAX_RECONNECT_ATTEMPTS);
                let _ = self.events.send(ClientEvent::Failed(
                    SignalingError::MaxReconnectAttemptsExceeded {
                        attempts: MAX_RECONNECT_ATTEMPTS,
                    },
                ));
                return;
            }

            debug!(
                "Reconnecting ({}/{})",
                attempts, MAX_RECONNECT_ATTEMPTS
            );
            tokio::time::sleep(RECONNECT_DELAY * attempts).await;
        }
    }

    /// Shuttle messages both ways until the link dies. Returns false when
    /// the application handle is gone and the task should end for good.
    async fn pump(&mut self, mut link: SignalingLink) -> bool {
        // Order is preserved: messages stranded by the previous link go
        // out before anything newly queued in `user_rx`.
        while let Some(message) = self.pending.pop_front() {
            if let Err(e) = link.outgoing.send(message) {
                self.pending.push_front(e.0);
                return true;
            }
        }

        loop {
            tokio::select! {
                user = self.user_rx.recv() => match user {
                    Some(message) => {
                        if let Err(e) = link.outgoing.send(message) {
                            self.pending.push_back(e.0);
                            return true;
                        }
                    }
                    // Every handle dropped: nothing left to do, ever.
                    None => return false,
                },
                inbound = link.incoming.recv() => match inbound {
                    Some(message) => {
                        let _ = self.events.send(ClientEvent::Message(message));
                    }
                    None => return true,
                },
            }
        }
    }
}
