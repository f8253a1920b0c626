use crate::transport::{ChannelEvent, ChunkedTransport, Frame, TransportError};
use airbeam_core::BUFFER_LOW_WATER;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, mpsc};

struct Shared {
    /// Events for this side's consumer; `Closed` lands here on close.
    local_tx: mpsc::UnboundedSender<ChannelEvent>,
    /// Events for the remote consumer; our sends land there.
    remote_tx: mpsc::UnboundedSender<ChannelEvent>,
    buffered: AtomicUsize,
    drain_notify: Notify,
    closed: Arc<AtomicBool>,
    /// When set, sends accumulate in `buffered` until `flush` is called,
    /// modeling a link slower than the sender.
    manual_drain: bool,
}

/// In-memory transport pair: everything one side sends arrives, in order,
/// on the other side's event stream. The default pair drains instantly;
/// [`MemoryChannel::pair_manual`] holds bytes in the outgoing buffer until
/// the test flushes them, to exercise the backpressure path.
#[derive(Clone)]
pub struct MemoryChannel {
    shared: Arc<Shared>,
}

impl MemoryChannel {
    pub fn pair() -> (
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
    ) {
        Self::build(false)
    }

    pub fn pair_manual() -> (
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
    ) {
        Self::build(true)
    }

    fn build(
        manual_drain: bool,
    ) -> (
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
        (Self, mpsc::UnboundedReceiver<ChannelEvent>),
    ) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let a = Self {
            shared: Arc::new(Shared {
                local_tx: a_tx.clone(),
                remote_tx: b_tx.clone(),
                buffered: AtomicUsize::new(0),
                drain_notify: Notify::new(),
                closed: closed.clone(),
                manual_drain,
            }),
        };
        let b = Self {
            shared: Arc::new(Shared {
                local_tx: b_tx,
                remote_tx: a_tx,
                buffered: AtomicUsize::new(0),
                drain_notify: Notify::new(),
                closed,
                manual_drain,
            }),
        };

        // Both ends report ready immediately.
        let _ = a.shared.local_tx.send(ChannelEvent::Open);
        let _ = b.shared.local_tx.send(ChannelEvent::Open);

        ((a, a_rx), (b, b_rx))
    }

    /// Release the outgoing buffer of a manual-drain channel, waking a
    /// sender suspended in `drained`.
    pub fn flush(&self) {
        self.shared.buffered.store(0, Ordering::SeqCst);
        self.shared.drain_notify.notify_waiters();
    }
}

#[async_trait]
impl ChunkedTransport for MemoryChannel {
    fn send(&self, frame: Frame) -> Result<(), TransportError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if self.shared.manual_drain {
            self.shared
                .buffered
                .fetch_add(frame.len(), Ordering::SeqCst);
        }
        self.shared
            .remote_tx
            .send(ChannelEvent::Frame(frame))
            .map_err(|_| TransportError::Closed)
    }

    fn buffered_amount(&self) -> usize {
        self.shared.buffered.load(Ordering::SeqCst)
    }

    async fn drained(&self) {
        loop {
            // Register before re-checking, so a flush landing between the
            // check and the await cannot be missed.
            let notified = self.shared.drain_notify.notified();
            if self.shared.buffered.load(Ordering::SeqCst) < BUFFER_LOW_WATER
                || self.shared.closed.load(Ordering::SeqCst)
            {
                return;
            }
            notified.await;
        }
    }

    fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shared.remote_tx.send(ChannelEvent::Closed);
        let _ = self.shared.local_tx.send(ChannelEvent::Closed);
        self.shared.drain_notify.notify_waiters();
    }
}
