use crate::error::RelayError;
use crate::http::AppState;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use beacon_core::{ClientEvent, ConnectionId, ServerEvent};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Persistent-connection transport. One socket per browser tab; the
/// connection id is minted here, at accept time.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    let connection_id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, app))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, app: AppState) {
    info!(connection = %connection_id, "websocket connected");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    app.connections.add(connection_id, tx);

    let keepalive_interval = app.config.keepalive_interval;
    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(keepalive_interval);
        ping.tick().await;
        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => error!("failed to serialize outbound event: {}", e),
                    }
                }
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let app = app.clone();

        async move {
            loop {
                let frame =
                    tokio::time::timeout(app.config.keepalive_timeout, receiver.next()).await;

                match frame {
                    Err(_) => {
                        warn!(connection = %connection_id, "keep-alive expired");
                        break;
                    }
                    Ok(None) | Ok(Some(Err(_))) => break,
                    Ok(Some(Ok(msg))) => match msg {
                        Message::Text(text) => {
                            match serde_json::from_str::<ClientEvent>(&text) {
                                Ok(event) => app.router.handle_event(connection_id, event),
                                Err(e) => {
                                    // Bad frame, connection stays open.
                                    let err = RelayError::Protocol(e);
                                    app.router.stats().count_protocol_error();
                                    warn!(connection = %connection_id, %err, "dropped frame");
                                }
                            }
                        }
                        Message::Close(_) => break,
                        // Pongs (and anything else) only matter as liveness,
                        // which the timeout above already accounts for.
                        _ => {}
                    },
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Graceful close, socket error and keep-alive expiry all land here as
    // one disconnect signal.
    app.connections.remove(&connection_id);
    app.router.handle_disconnect(connection_id);
    info!(connection = %connection_id, "websocket disconnected");
}
