use airbeam_core::SignalingMessage;

use crate::integration::{connect_peer, create_test_relay, init_tracing, send_from};
use crate::utils::next_kind_for;

#[tokio::test]
async fn test_create_public_room() {
    init_tracing();

    let (cmd_tx, _output, mut rx) = create_test_relay();
    let creator = connect_peer(&cmd_tx, &mut rx).await;

    send_from(
        &cmd_tx,
        &creator,
        SignalingMessage::CreateRoom {
            is_public: true,
            room_id: None,
        },
    )
    .await;

    let msg = next_kind_for(&mut rx, &creator.id, "room-created")
        .await
        .expect("no room-created");
    let SignalingMessage::RoomCreated { room_id, users } = msg else {
        panic!("expected room-created");
    };

    assert_eq!(room_id.as_str().len(), 6);
    assert_eq!(users, vec![creator.clone()]);

    // The fresh room shows up in the public listing.
    send_from(&cmd_tx, &creator, SignalingMessage::GetPublicRooms).await;
    let msg = next_kind_for(&mut rx, &creator.id, "public-rooms")
        .await
        .expect("no public-rooms");
    assert_eq!(msg, SignalingMessage::PublicRooms { rooms: vec![room_id] });
}
