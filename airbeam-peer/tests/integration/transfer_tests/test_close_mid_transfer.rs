use airbeam_core::{BUFFER_HIGH_WATER, CHUNK_SIZE, FileMetadata};
use airbeam_peer::{MemoryChannel, SessionState, TransferError, TransferSession};
use bytes::Bytes;
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{wait_for_error, wait_for_state};

/// Closing the sending session while it is suspended on backpressure
/// tears the channel down; the receiver, mid-file, reports the loss
/// instead of waiting forever.
#[tokio::test]
async fn test_close_while_suspended_fails_receiver() {
    init_tracing();

    let ((a, a_rx), (b, b_rx)) = MemoryChannel::pair_manual();
    let (sender, mut sender_rx) = TransferSession::spawn(Arc::new(a), a_rx);
    let (_receiver, mut receiver_rx) = TransferSession::spawn(Arc::new(b), b_rx);

    let total_chunks = BUFFER_HIGH_WATER / CHUNK_SIZE + 10;
    let data = Bytes::from(vec![5u8; total_chunks * CHUNK_SIZE]);
    sender
        .send_file(
            FileMetadata::new("doomed.bin", data.len() as u64, "application/octet-stream"),
            data,
        )
        .await
        .expect("send_file");

    // Wait until the receiver is demonstrably mid-file, then pull the plug.
    wait_for_state(&mut receiver_rx, SessionState::Transferring)
        .await
        .expect("receiver never started");
    sender.close().await;

    let err = wait_for_error(&mut receiver_rx).await.expect("no error");
    assert_eq!(err, TransferError::TransportClosed);
    wait_for_state(&mut receiver_rx, SessionState::Failed)
        .await
        .expect("receiver never failed");

    // The closed sender settles back to idle, not failed.
    wait_for_state(&mut sender_rx, SessionState::Idle)
        .await
        .expect("sender never went idle");
}
