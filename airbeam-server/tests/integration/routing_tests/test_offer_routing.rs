use airbeam_core::{PeerId, SignalingMessage};
use serde_json::json;

use crate::integration::{connect_peer, create_test_relay, init_tracing, send_from};
use crate::utils::next_kind_for;

/// Offers, answers and candidates reach the named member of the sender's
/// room, and `from` is always the authenticated sender — whatever the
/// client claimed.
#[tokio::test]
async fn test_offer_routed_with_injected_from() {
    init_tracing();

    let (cmd_tx, _output, mut rx) = create_test_relay();
    let alice = connect_peer(&cmd_tx, &mut rx).await;
    let bob = connect_peer(&cmd_tx, &mut rx).await;

    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::CreateRoom {
            is_public: true,
            room_id: None,
        },
    )
    .await;
    let SignalingMessage::RoomCreated { room_id, .. } =
        next_kind_for(&mut rx, &alice.id, "room-created")
            .await
            .expect("no room-created")
    else {
        panic!("expected room-created");
    };
    send_from(&cmd_tx, &bob, SignalingMessage::JoinRoom { room_id }).await;
    next_kind_for(&mut rx, &bob.id, "user-list-update")
        .await
        .expect("no user-list-update");

    // Alice spoofs `from`; the relay must overwrite it.
    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::Offer {
            to: bob.id.clone(),
            sdp: "v=0 fake-offer".into(),
            from: Some(PeerId::new()),
        },
    )
    .await;

    let msg = next_kind_for(&mut rx, &bob.id, "offer")
        .await
        .expect("offer not forwarded");
    assert_eq!(
        msg,
        SignalingMessage::Offer {
            to: bob.id.clone(),
            sdp: "v=0 fake-offer".into(),
            from: Some(alice.id.clone()),
        }
    );

    // And the answer comes back the same way.
    send_from(
        &cmd_tx,
        &bob,
        SignalingMessage::Answer {
            to: alice.id.clone(),
            sdp: "v=0 fake-answer".into(),
            from: None,
        },
    )
    .await;
    let msg = next_kind_for(&mut rx, &alice.id, "answer")
        .await
        .expect("answer not forwarded");
    let SignalingMessage::Answer { from, .. } = msg else {
        panic!("expected answer");
    };
    assert_eq!(from, Some(bob.id.clone()));

    // Candidates carry their payload through untouched.
    let candidate = json!({"candidate": "candidate:0 1 UDP 1 192.0.2.1 5000 typ host"});
    send_from(
        &cmd_tx,
        &alice,
        SignalingMessage::IceCandidate {
            to: bob.id.clone(),
            candidate: candidate.clone(),
            from: None,
        },
    )
    .await;
    let msg = next_kind_for(&mut rx, &bob.id, "ice-candidate")
        .await
        .expect("candidate not forwarded");
    let SignalingMessage::IceCandidate {
        candidate: got,
        from,
        ..
    } = msg
    else {
        panic!("expected ice-candidate");
    };
    assert_eq!(got, candidate);
    assert_eq!(from, Some(alice.id.clone()));
}
