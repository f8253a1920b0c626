use airbeam_core::{RoomId, SignalingMessage};

use crate::integration::{connect_peer, create_test_relay, init_tracing, send_from};
use crate::utils::next_kind_for;

#[tokio::test]
async fn test_private_room_conflict() {
    init_tracing();

    let (cmd_tx, _output, mut rx) = create_test_relay();
    let first = connect_peer(&cmd_tx, &mut rx).await;
    let second = connect_peer(&cmd_tx, &mut rx).await;

    let wanted = RoomId::from("movie-night");

    send_from(
        &cmd_tx,
        &first,
        SignalingMessage::CreateRoom {
            is_public: false,
            room_id: Some(wanted.clone()),
        },
    )
    .await;
    let msg = next_kind_for(&mut rx, &first.id, "room-created")
        .await
        .expect("no room-created");
    let SignalingMessage::RoomCreated { room_id, .. } = msg else {
        panic!("expected room-created");
    };
    assert_eq!(room_id, wanted);

    // Same id again: the second creator gets an error, not a room.
    send_from(
        &cmd_tx,
        &second,
        SignalingMessage::CreateRoom {
            is_public: false,
            room_id: Some(wanted),
        },
    )
    .await;
    let msg = next_kind_for(&mut rx, &second.id, "error")
        .await
        .expect("no error reply");
    assert!(matches!(msg, SignalingMessage::Error { .. }));
}

#[tokio::test]
async fn test_private_room_without_id_is_rejected() {
    init_tracing();

    let (cmd_tx, _output, mut rx) = create_test_relay();
    let creator = connect_peer(&cmd_tx, &mut rx).await;

    send_from(
        &cmd_tx,
        &creator,
        SignalingMessage::CreateRoom {
            is_public: false,
            room_id: None,
        },
    )
    .await;

    let msg = next_kind_for(&mut rx, &creator.id, "error")
        .await
        .expect("no error reply");
    assert!(matches!(msg, SignalingMessage::Error { .. }));
}

#[tokio::test]
async fn test_private_rooms_stay_out_of_public_listing() {
    init_tracing();

    let (cmd_tx, _output, mut rx) = create_test_relay();
    let creator = connect_peer(&cmd_tx, &mut rx).await;

    send_from(
        &cmd_tx,
        &creator,
        SignalingMessage::CreateRoom {
            is_public: false,
            room_id: Some(RoomId::from("hidden")),
        },
    )
    .await;
    next_kind_for(&mut rx, &creator.id, "room-created")
        .await
        .expect("no room-created");

    send_from(&cmd_tx, &creator, SignalingMessage::GetPublicRooms).await;
    let msg = next_kind_for(&mut rx, &creator.id, "public-rooms")
        .await
        .expect("no public-rooms");
    assert_eq!(msg, SignalingMessage::PublicRooms { rooms: vec![] });
}
