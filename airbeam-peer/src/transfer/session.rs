use crate::transfer::{
    AssemblyStep, FileAssembler, FileChunker, ReceivedFile, TransferError,
};
use crate::transport::{ChannelEvent, ChunkedTransport, Frame};
use airbeam_core::{BUFFER_HIGH_WATER, ChannelMessage, FileMetadata, TransferProgress};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Negotiating,
    Open,
    Transferring,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum SessionCommand {
    SendFile { metadata: FileMetadata, data: Bytes },
    Close,
}

#[derive(Debug)]
pub enum SessionEvent {
    StateChanged(SessionState),
    Progress(TransferProgress),
    FileReceived(ReceivedFile),
    Error(TransferError),
}

/// Cheap handle into a running session. Extra send requests while a
/// transfer is active queue FIFO inside the session; they never interleave.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send_file(&self, metadata: FileMetadata, data: Bytes) -> Result<(), TransferError> {
        self.cmd_tx
            .send(SessionCommand::SendFile { metadata, data })
            .await
            .map_err(|_| TransferError::TransportClosed)
    }

    pub async fn close(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Close).await;
    }

    /// Whether two handles drive the same session task.
    pub fn same_session(&self, other: &SessionHandle) -> bool {
        self.cmd_tx.same_channel(&other.cmd_tx)
    }
}

struct OutgoingTransfer {
    metadata: FileMetadata,
    chunker: FileChunker,
    metadata_sent: bool,
}

enum Step {
    Cmd(Option<SessionCommand>),
    Evt(Option<ChannelEvent>),
    Sent(Result<TransferProgress, TransferError>),
}

/// Per-peer transfer state machine, one task per session. Drives chunked
/// send with the 1 MiB backpressure gate and chunked receive through the
/// assembler; commands and transport events are checked between every
/// chunk, so close/cancel takes effect at the next iteration boundary.
pub struct TransferSession {
    state: SessionState,
    transport: Arc<dyn ChunkedTransport>,
    transport_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    queue: VecDeque<(FileMetadata, Bytes)>,
    outgoing: Option<OutgoingTransfer>,
    assembler: FileAssembler,
    channel_open: bool,
}

impl TransferSession {
    pub fn spawn(
        transport: Arc<dyn ChunkedTransport>,
        transport_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Self {
            state: SessionState::Idle,
            transport,
            transport_rx,
            cmd_rx,
            events: event_tx,
            queue: VecDeque::new(),
            outgoing: None,
            assembler: FileAssembler::new(),
            channel_open: false,
        };
        tokio::spawn(session.run());

        (SessionHandle { cmd_tx }, event_rx)
    }

    pub async fn run(mut self) {
        debug!("Transfer session started");
        self.set_state(SessionState::Negotiating);

        loop {
            // Commands and inbound events win over the send pump, which is
            // what makes cancellation effective once per chunk.
            let step = match &mut self.outgoing {
                Some(active) => tokio::select! {
                    biased;
                    cmd = self.cmd_rx.recv() => Step::Cmd(cmd),
                    evt = self.transport_rx.recv() => Step::Evt(evt),
                    res = send_next(self.transport.as_ref(), active) => Step::Sent(res),
                },
                None => tokio::select! {
                    cmd = self.cmd_rx.recv() => Step::Cmd(cmd),
                    evt = self.transport_rx.recv() => Step::Evt(evt),
                },
            };

            match step {
                Step::Cmd(Some(cmd)) => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Step::Cmd(None) => {
                    debug!("Session handle dropped, closing transport");
                    self.transport.close();
                    break;
                }
                Step::Evt(Some(evt)) => {
                    if !self.handle_event(evt) {
                        break;
                    }
                }
                Step::Evt(None) => {
                    self.on_transport_gone();
                    break;
                }
                Step::Sent(Ok(progress)) => {
                    let _ = self.events.send(SessionEvent::Progress(progress));
                    if progress.is_complete() {
                        info!("Send complete ({} bytes)", progress.total_bytes);
                        self.outgoing = None;
                        self.set_state(SessionState::Completed);
                        self.next_or_idle();
                    }
                }
                Step::Sent(Err(e)) => {
                    let fatal = matches!(
                        e,
                        TransferError::TransportClosed | TransferError::TransportFailed(_)
                    );
                    self.fail(e);
                    if fatal {
                        break;
                    }
                    self.next_or_idle();
                }
            }
        }

        debug!("Transfer session finished");
    }

    /// Returns false when the session should tear down.
    fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::SendFile { metadata, data } => {
                debug!("Queueing '{}' ({} bytes)", metadata.name, metadata.size);
                self.queue.push_back((metadata, data));
                if self.channel_open && self.outgoing.is_none() {
                    self.start_next();
                }
                true
            }
            SessionCommand::Close => {
                info!("Session closed locally");
                self.transport.close();
                self.outgoing = None;
                self.assembler.reset();
                self.set_state(SessionState::Idle);
                false
            }
        }
    }

    fn handle_event(&mut self, evt: ChannelEvent) -> bool {
        match evt {
            ChannelEvent::Open => {
                self.channel_open = true;
                self.set_state(SessionState::Open);
                if self.outgoing.is_none() && !self.queue.is_empty() {
                    self.start_next();
                }
                true
            }

            ChannelEvent::Frame(Frame::Text(json)) => {
                match serde_json::from_str::<ChannelMessage>(&json) {
                    Ok(ChannelMessage::FileMetadata { metadata }) => {
                        debug!("Receiving '{}' ({} bytes)", metadata.name, metadata.size);
                        let step = self.assembler.start(metadata);
                        self.on_assembly(Ok(step));
                    }
                    // Unknown control frames are logged and dropped.
                    Err(e) => warn!("Unparseable control frame: {}", e),
                }
                true
            }

            ChannelEvent::Frame(Frame::Binary(chunk)) => {
                let result = self.assembler.accept_chunk(chunk);
                self.on_assembly(result);
                true
            }

            ChannelEvent::Closed => {
                self.on_transport_gone();
                false
            }

            ChannelEvent::Error(msg) => {
                self.fail(TransferError::TransportFailed(msg));
                false
            }
        }
    }

    fn on_assembly(&mut self, result: Result<AssemblyStep, TransferError>) {
        match result {
            Ok(AssemblyStep::Incomplete(progress)) => {
                self.set_state(SessionState::Transferring);
                let _ = self.events.send(SessionEvent::Progress(progress));
            }
            Ok(AssemblyStep::Complete(file)) => {
                info!("Received '{}' ({} bytes)", file.metadata.name, file.metadata.size);
                let _ = self.events.send(SessionEvent::Progress(TransferProgress::new(
                    file.metadata.size,
                    file.metadata.size,
                )));
                let _ = self.events.send(SessionEvent::FileReceived(file));
                self.set_state(SessionState::Completed);
                self.next_or_idle();
            }
            Err(e) => {
                self.fail(e);
                self.next_or_idle();
            }
        }
    }

    fn on_transport_gone(&mut self) {
        self.channel_open = false;
        if self.outgoing.is_some() || self.assembler.in_flight() {
            self.fail(TransferError::TransportClosed);
        } else {
            self.set_state(SessionState::Idle);
        }
    }

    fn fail(&mut self, error: TransferError) {
        warn!("Transfer failed: {}", error);
        self.outgoing = None;
        self.assembler.reset();
        let _ = self.events.send(SessionEvent::Error(error));
        self.set_state(SessionState::Failed);
    }

    /// `completed`/`failed` settle back to `idle`; the next queued file
    /// starts right away when the channel is still up.
    fn next_or_idle(&mut self) {
        self.set_state(SessionState::Idle);
        if self.channel_open && !self.queue.is_empty() {
            self.start_next();
        }
    }

    fn start_next(&mut self) {
        if let Some((metadata, data)) = self.queue.pop_front() {
            info!("Sending '{}' ({} bytes)", metadata.name, metadata.size);
            self.outgoing = Some(OutgoingTransfer {
                chunker: FileChunker::new(data),
                metadata,
                metadata_sent: false,
            });
            self.set_state(SessionState::Transferring);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("Session state {:?} -> {:?}", self.state, state);
            self.state = state;
            let _ = self.events.send(SessionEvent::StateChanged(state));
        }
    }
}

/// One pump iteration: the metadata frame first, then exactly one chunk,
/// suspending beforehand when the transport's buffer is above the high
/// water mark. Cancel-safe: nothing is consumed from the chunker until the
/// chunk is actually handed to the transport.
async fn send_next(
    transport: &dyn ChunkedTransport,
    active: &mut OutgoingTransfer,
) -> Result<TransferProgress, TransferError> {
    if !active.metadata_sent {
        let control = ChannelMessage::FileMetadata {
            metadata: active.metadata.clone(),
        };
        let json =
            serde_json::to_string(&control).map_err(|e| TransferError::Codec(e.to_string()))?;
        transport.send(Frame::Text(json))?;
        active.metadata_sent = true;
        // A zero-length file is complete right after its metadata.
        return Ok(active.chunker.progress());
    }

    if transport.buffered_amount() > BUFFER_HIGH_WATER {
        transport.drained().await;
    }

    if let Some(chunk) = active.chunker.next_chunk() {
        transport.send(Frame::Binary(chunk))?;
    }
    Ok(active.chunker.progress())
}
