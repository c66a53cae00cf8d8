use crate::http::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use beacon_core::{ClientEvent, ConnectionId, ServerEvent};
use dashmap::DashMap;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Long-poll fallback transport for clients that cannot hold a WebSocket.
///
/// A session owns the receiving half of the same outbound channel the
/// WebSocket path uses, so the router cannot tell the transports apart.
/// Liveness comes from the polls themselves: a session nobody polls within
/// the keep-alive timeout is reaped as an abrupt disconnect.
#[derive(Debug, Default)]
pub struct PollSessions {
    sessions: DashMap<ConnectionId, PollSession>,
}

#[derive(Debug)]
struct PollSession {
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ServerEvent>>>,
    last_seen: Mutex<Instant>,
}

impl PollSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, connection_id: ConnectionId, rx: mpsc::UnboundedReceiver<ServerEvent>) {
        self.sessions.insert(
            connection_id,
            PollSession {
                rx: Arc::new(tokio::sync::Mutex::new(rx)),
                last_seen: Mutex::new(Instant::now()),
            },
        );
    }

    /// Refresh liveness and hand back the session queue.
    fn touch(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ServerEvent>>>> {
        let session = self.sessions.get(connection_id)?;
        *session.last_seen.lock().expect("session clock poisoned") = Instant::now();
        Some(Arc::clone(&session.rx))
    }

    fn remove(&self, connection_id: &ConnectionId) -> bool {
        self.sessions.remove(connection_id).is_some()
    }

    /// Sessions silent past `timeout`, for the reaper.
    fn expired(&self, timeout: std::time::Duration) -> Vec<ConnectionId> {
        self.sessions
            .iter()
            .filter(|entry| {
                entry
                    .last_seen
                    .lock()
                    .expect("session clock poisoned")
                    .elapsed()
                    > timeout
            })
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// `POST /poll` — open a session and mint its connection id.
pub async fn open_session(State(app): State<AppState>) -> Json<Value> {
    let connection_id = ConnectionId::new();
    let (tx, rx) = mpsc::unbounded_channel();

    app.connections.add(connection_id, tx);
    app.sessions.insert(connection_id, rx);
    info!(connection = %connection_id, "poll session opened");

    Json(json!({ "connectionId": connection_id }))
}

/// `GET /poll/{connectionId}` — park up to the poll window, then return
/// whatever is queued (possibly nothing).
pub async fn poll_session(
    Path(connection_id): Path<ConnectionId>,
    State(app): State<AppState>,
) -> Result<Json<Vec<ServerEvent>>, StatusCode> {
    let rx = app
        .sessions
        .touch(&connection_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut rx = rx.lock().await;
    let mut batch = Vec::new();
    if let Ok(Some(event)) = tokio::time::timeout(app.config.poll_window, rx.recv()).await {
        batch.push(event);
        while let Ok(event) = rx.try_recv() {
            batch.push(event);
        }
    }
    drop(rx);

    // A full poll window may have gone by; refresh before handing back.
    app.sessions.touch(&connection_id);
    Ok(Json(batch))
}

/// `POST /poll/{connectionId}` — submit a batch of inbound events,
/// processed strictly in array order.
pub async fn submit_events(
    Path(connection_id): Path<ConnectionId>,
    State(app): State<AppState>,
    Json(events): Json<Vec<ClientEvent>>,
) -> Result<StatusCode, StatusCode> {
    app.sessions
        .touch(&connection_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    for event in events {
        app.router.handle_event(connection_id, event);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /poll/{connectionId}` — graceful close.
pub async fn close_session(
    Path(connection_id): Path<ConnectionId>,
    State(app): State<AppState>,
) -> StatusCode {
    if !app.sessions.remove(&connection_id) {
        return StatusCode::NOT_FOUND;
    }

    app.connections.remove(&connection_id);
    app.router.handle_disconnect(connection_id);
    info!(connection = %connection_id, "poll session closed");
    StatusCode::NO_CONTENT
}

/// Periodically expire sessions nobody is polling anymore. Expiry funnels
/// into the same disconnect path as a dropped WebSocket.
pub(crate) fn spawn_reaper(app: AppState) {
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(app.config.keepalive_interval);
        loop {
            sweep.tick().await;
            for connection_id in app.sessions.expired(app.config.keepalive_timeout) {
                warn!(connection = %connection_id, "poll session expired");
                app.sessions.remove(&connection_id);
                app.connections.remove(&connection_id);
                app.router.handle_disconnect(connection_id);
            }
        }
    });
}
