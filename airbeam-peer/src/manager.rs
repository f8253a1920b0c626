use crate::transfer::{SessionEvent, SessionHandle, TransferError, TransferSession};
use crate::transport::{ChannelEvent, ChunkedTransport, TransportError};
use airbeam_core::{FileMetadata, Member, PeerId, PeerRole, role};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Capability to open a data channel to a remote peer. The manager only
/// dials when the role resolver says this side initiates; inbound channels
/// arrive through [`SessionManager::accept`].
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn dial(
        &self,
        remote: &PeerId,
    ) -> Result<
        (
            Arc<dyn ChunkedTransport>,
            mpsc::UnboundedReceiver<ChannelEvent>,
        ),
        TransportError,
    >;
}

/// One transfer session per remote peer. Applies the role tie-break to
/// membership snapshots so exactly one side of each new pair dials, and
/// never re-dials a pair that is already connecting or connected.
pub struct SessionManager {
    local_id: PeerId,
    connector: Arc<dyn PeerConnector>,
    sessions: Arc<DashMap<PeerId, SessionHandle>>,
    connecting: Arc<DashSet<PeerId>>,
    events: mpsc::UnboundedSender<(PeerId, SessionEvent)>,
}

impl SessionManager {
    pub fn new(
        local_id: PeerId,
        connector: Arc<dyn PeerConnector>,
    ) -> (Self, mpsc::UnboundedReceiver<(PeerId, SessionEvent)>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                local_id,
                connector,
                sessions: Arc::new(DashMap::new()),
                connecting: Arc::new(DashSet::new()),
                events: event_tx,
            },
            event_rx,
        )
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// Feed a `user-list-update` snapshot. For every newly visible member
    /// this side resolves its role and, as initiator, dials; as responder
    /// it waits for the inbound channel.
    pub async fn apply_user_list(&self, users: &[Member]) {
        for user in users {
            if user.id == self.local_id || self.is_known(&user.id) {
                continue;
            }

            match role::resolve(&self.local_id, &user.id) {
                PeerRole::Initiator => {
                    debug!("Initiating channel to {} ({})", user.username, user.id);
                    self.dial(user.id.clone()).await;
                }
                PeerRole::Responder => {
                    debug!("Waiting for channel from {} ({})", user.username, user.id);
                }
            }
        }
    }

    /// Register an inbound channel from a remote initiator. Ignored when a
    /// session for the pair already exists.
    pub fn accept(
        &self,
        remote: PeerId,
        transport: Arc<dyn ChunkedTransport>,
        transport_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    ) {
        if self.is_known(&remote) {
            debug!("Dropping duplicate inbound channel from {}", remote);
            transport.close();
            return;
        }
        self.install(remote, transport, transport_rx);
    }

    /// Queue a file for a peer, dialing first when no channel exists yet.
    /// Requests to a busy session queue FIFO inside it.
    pub async fn send_file(
        &self,
        remote: &PeerId,
        metadata: FileMetadata,
        data: Bytes,
    ) -> Result<(), TransferError> {
        if !self.is_known(remote) {
            self.dial(remote.clone()).await;
        }
        // Clone the handle out of the map so no shard guard is held
        // across the await below.
        let Some(session) = self.sessions.get(remote).map(|s| s.value().clone()) else {
            return Err(TransferError::TransportClosed);
        };
        session.send_file(metadata, data).await
    }

    pub async fn close_session(&self, remote: &PeerId) {
        if let Some((_, session)) = self.sessions.remove(remote) {
            session.close().await;
        }
    }

    fn is_known(&self, remote: &PeerId) -> bool {
        self.sessions.contains_key(remote) || self.connecting.contains(remote)
    }

    async fn dial(&self, remote: PeerId) {
        if !self.connecting.insert(remote.clone()) {
            return;
        }

        match self.connector.dial(&remote).await {
            Ok((transport, transport_rx)) => {
                self.install(remote.clone(), transport, transport_rx);
            }
            Err(e) => warn!("Failed to dial {}: {}", remote, e),
        }
        self.connecting.remove(&remote);
    }

    fn install(
        &self,
        remote: PeerId,
        transport: Arc<dyn ChunkedTransport>,
        transport_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    ) {
        let (handle, mut session_events) = TransferSession::spawn(transport, transport_rx);
        self.sessions.insert(remote.clone(), handle.clone());

        // Tag session events with the peer and drop the entry when the
        // session ends, so a later reconnect can establish a fresh one.
        // The guarded remove leaves a replacement session alone.
        let events = self.events.clone();
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            while let Some(event) = session_events.recv().await {
                if events.send((remote.clone(), event)).is_err() {
                    break;
                }
            }
            sessions.remove_if(&remote, |_, current| current.same_session(&handle));
        });
    }
}
