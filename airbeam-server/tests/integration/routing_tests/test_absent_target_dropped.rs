use airbeam_core::{PeerId, SignalingMessage};

use crate::integration::{connect_peer, create_test_relay, init_tracing, send_from};
use crate::utils::{expect_silence_for, next_kind_for};

/// Routing to an id that is not in the sender's room drops the message:
/// no forward, no error reply, and the connection stays usable. The drop
/// itself is visible to the operator in the relay's logs.
#[tokio::test]
async fn test_offer_to_absent_target_is_dropped() {
    init_tracing();

    let (cmd_tx, output, mut rx) = create_test_relay();
    let alice = connect_peer(&cmd_tx, &mut rx).await;
    let outsider = connect_peer(&cmd_tx, &mut rx).await;

    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::CreateRoom {
            is_public: true,
            room_id: None,
        },
    )
    .await;
    next_kind_for(&mut rx, &alice.id, "room-created")
        .await
        .expect("no room-created");

    // Target is connected but not a member of alice's room.
    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::Offer {
            to: outsider.id.clone(),
            sdp: "v=0".into(),
            from: None,
        },
    )
    .await;

    // Nothing is forwarded and the sender gets no error either.
    expect_silence_for(&mut rx, &outsider.id, 200)
        .await
        .expect("offer leaked to a non-member");
    assert_eq!(output.count_for(&alice.id, "error"), 0);

    // Same for a target id that was never connected at all.
    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::Offer {
            to: PeerId::new(),
            sdp: "v=0".into(),
            from: None,
        },
    )
    .await;

    // The connection is not torn down: the relay still answers.
    send_from(&cmd_tx, &alice, SignalingMessage::GetPublicRooms).await;
    next_kind_for(&mut rx, &alice.id, "public-rooms")
        .await
        .expect("relay should still answer");
}
