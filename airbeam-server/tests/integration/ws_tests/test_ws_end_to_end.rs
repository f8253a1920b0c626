use airbeam_core::{PeerId, SignalingMessage};
use airbeam_server::{AppState, ClientChannels, RelayCommand, SignalingRelay, ws_handler};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

struct WsClient {
    id: PeerId,
    sink: WsSink,
    source: WsSource,
}

impl WsClient {
    /// Connect over a real socket and consume the welcome message.
    async fn connect(addr: SocketAddr) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("ws connect failed")?;
        let (sink, source) = ws.split();
        let mut client = Self {
            id: PeerId::new(),
            sink,
            source,
        };

        let SignalingMessage::Welcome { id, .. } = client.recv().await? else {
            anyhow::bail!("expected welcome first");
        };
        client.id = id;
        Ok(client)
    }

    async fn send(&mut self, message: &SignalingMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        self.sink
            .send(Message::Text(json.into()))
            .await
            .context("ws send failed")
    }

    async fn recv(&mut self) -> Result<SignalingMessage> {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), self.source.next())
                .await
                .context("timed out waiting for a message")?
                .context("connection closed")??;
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).context("bad message from relay");
            }
        }
    }

    async fn recv_kind(&mut self, kind: &str) -> Result<SignalingMessage> {
        loop {
            let msg = self.recv().await?;
            if msg.kind() == kind {
                return Ok(msg);
            }
        }
    }
}

async fn spawn_server() -> Result<SocketAddr> {
    let channels = ClientChannels::new();
    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(256);
    let relay = SignalingRelay::new(relay_rx, Arc::new(channels.clone()));
    tokio::spawn(relay.run());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(AppState { channels, relay_tx });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind failed")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Two clients over real WebSockets: create a room, join it, route an
/// offer/answer pair, then observe the leave broadcast when one hangs up.
#[tokio::test]
async fn test_ws_end_to_end() {
    init_tracing();

    let addr = spawn_server().await.expect("server failed to start");

    let mut alice = WsClient::connect(addr).await.expect("alice connect");
    let mut bob = WsClient::connect(addr).await.expect("bob connect");

    alice
        .send(&SignalingMessage::CreateRoom {
            is_public: true,
            room_id: None,
        })
        .await
        .expect("send create-room");
    let SignalingMessage::RoomCreated { room_id, users } =
        alice.recv_kind("room-created").await.expect("room-created")
    else {
        panic!("expected room-created");
    };
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, alice.id);

    bob.send(&SignalingMessage::JoinRoom {
        room_id: room_id.clone(),
    })
    .await
    .expect("send join-room");

    for client in [&mut alice, &mut bob] {
        let SignalingMessage::UserListUpdate { users } = client
            .recv_kind("user-list-update")
            .await
            .expect("user-list-update")
        else {
            panic!("expected user-list-update");
        };
        assert_eq!(users.len(), 2);
    }

    // Offer travels alice -> relay -> bob with `from` stamped on.
    alice
        .send(&SignalingMessage::Offer {
            to: bob.id.clone(),
            sdp: "v=0 offer".into(),
            from: None,
        })
        .await
        .expect("send offer");
    let SignalingMessage::Offer { from, sdp, .. } = bob.recv_kind("offer").await.expect("offer")
    else {
        panic!("expected offer");
    };
    assert_eq!(from, Some(alice.id.clone()));
    assert_eq!(sdp, "v=0 offer");

    bob.send(&SignalingMessage::Answer {
        to: alice.id.clone(),
        sdp: "v=0 answer".into(),
        from: None,
    })
    .await
    .expect("send answer");
    let SignalingMessage::Answer { from, .. } = alice.recv_kind("answer").await.expect("answer")
    else {
        panic!("expected answer");
    };
    assert_eq!(from, Some(bob.id.clone()));

    // Bob hangs up; alice sees the shrunken membership.
    drop(bob);
    let SignalingMessage::UserListUpdate { users } = alice
        .recv_kind("user-list-update")
        .await
        .expect("leave broadcast")
    else {
        panic!("expected user-list-update");
    };
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, alice.id);
}

/// Malformed JSON is logged and dropped; the connection keeps working.
#[tokio::test]
async fn test_malformed_message_does_not_kill_connection() {
    init_tracing();

    let addr = spawn_server().await.expect("server failed to start");
    let mut client = WsClient::connect(addr).await.expect("connect");

    client
        .sink
        .send(Message::Text("{not json".into()))
        .await
        .expect("send garbage");

    client
        .send(&SignalingMessage::GetPublicRooms)
        .await
        .expect("send get-public-rooms");
    let msg = client
        .recv_kind("public-rooms")
        .await
        .expect("relay should still answer");
    assert_eq!(msg, SignalingMessage::PublicRooms { rooms: vec![] });
}
