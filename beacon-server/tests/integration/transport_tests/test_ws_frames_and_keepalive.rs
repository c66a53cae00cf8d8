use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use beacon_core::{ClientEvent, RoomId, ServerEvent, UserId};
use beacon_server::{AppState, TransportConfig, serve, signaling_routes};

use crate::init_tracing;

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_server(config: TransportConfig) -> (AppState, String) {
    let app = AppState::new(config);
    let routes = signaling_routes(app.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener address");
    let _server = tokio::spawn(serve(listener, routes));
    (app, format!("ws://{}/ws", addr))
}

fn join_frame(room: &str, user: &str) -> Message {
    let event = ClientEvent::Join {
        room_id: RoomId::from(room),
        user_id: UserId::from(user),
    };
    Message::Text(serde_json::to_string(&event).unwrap().into())
}

/// Next decoded signaling frame, skipping transport-level pings.
async fn next_server_event(ws: &mut WsClient) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(3), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server frame decodes");
        }
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..150 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met within 3s");
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_connection_survives() {
    init_tracing();
    let (app, url) = start_server(TransportConfig::default()).await;

    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    ws.send(Message::Text("definitely not json".into()))
        .await
        .unwrap();

    // The same connection still works afterwards.
    ws.send(join_frame("r1", "u1")).await.unwrap();
    assert_eq!(
        next_server_event(&mut ws).await,
        ServerEvent::Joined {
            room_id: RoomId::from("r1"),
        }
    );
    assert_eq!(app.router.stats().protocol_errors(), 1);
    assert_eq!(app.router.occupancy(), (1, 1));

    // Graceful close funnels into the disconnect path.
    ws.close(None).await.unwrap();
    eventually(|| app.router.occupancy() == (0, 0)).await;
}

#[tokio::test]
async fn silent_connection_expires_like_an_abrupt_disconnect() {
    init_tracing();
    let (app, url) = start_server(TransportConfig {
        keepalive_interval: Duration::from_millis(30),
        keepalive_timeout: Duration::from_millis(120),
        poll_window: Duration::from_millis(50),
    })
    .await;

    let (mut quiet, _) = connect_async(url.as_str()).await.expect("connect quiet");
    quiet.send(join_frame("r1", "u1")).await.unwrap();
    assert_eq!(
        next_server_event(&mut quiet).await,
        ServerEvent::Joined {
            room_id: RoomId::from("r1"),
        }
    );

    let (mut witness, _) = connect_async(url.as_str()).await.expect("connect witness");
    witness.send(join_frame("r1", "u2")).await.unwrap();
    assert_eq!(
        next_server_event(&mut witness).await,
        ServerEvent::Joined {
            room_id: RoomId::from("r1"),
        }
    );

    // `quiet` now stops reading and writing entirely, so it stops
    // answering pings; the witness keeps reading and stays alive.
    assert_eq!(
        next_server_event(&mut witness).await,
        ServerEvent::UserLeft {
            user_id: UserId::from("u1"),
        }
    );
    eventually(|| app.router.occupancy() == (1, 1)).await;
    // The socket object is still open on our side; only the server gave
    // up on it.
    drop(quiet);
}
