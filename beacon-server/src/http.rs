use crate::router::SignalingRouter;
use crate::transport::{
    ConnectionMap, PollSessions, TransportConfig, close_session, open_session, poll_session,
    spawn_reaper, submit_events, ws_handler,
};
use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

/// Everything the transport handlers share. The hosting HTTP layer owns
/// the listener, TLS and CORS; this state only covers the relay's own
/// sub-path namespace.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SignalingRouter>,
    pub connections: Arc<ConnectionMap>,
    pub sessions: Arc<PollSessions>,
    pub config: TransportConfig,
}

impl AppState {
    pub fn new(config: TransportConfig) -> Self {
        let connections = Arc::new(ConnectionMap::new());
        let router = Arc::new(SignalingRouter::new(connections.clone()));

        Self {
            router,
            connections,
            sessions: Arc::new(PollSessions::new()),
            config,
        }
    }
}

/// Build the relay's route tree, to be nested by the hosting layer under
/// its own listener. Also starts the poll-session reaper, so this must be
/// called from within a runtime.
pub fn signaling_routes(state: AppState) -> Router {
    spawn_reaper(state.clone());

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/poll", post(open_session))
        .route(
            "/poll/{connection_id}",
            get(poll_session).post(submit_events).delete(close_session),
        )
        .route("/status", get(status))
        .with_state(state)
}

/// Health payload for the process supervisor / load balancer.
async fn status(State(app): State<AppState>) -> Json<Value> {
    let (connections, rooms) = app.router.occupancy();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    Json(json!({
        "status": "ok",
        "message": "signaling relay online",
        "timestamp": timestamp,
        "transports": ["websocket", "polling"],
        "connections": connections,
        "rooms": rooms,
        "droppedProtocolErrors": app.router.stats().protocol_errors(),
        "droppedStateErrors": app.router.stats().state_errors(),
    }))
}

/// Run the relay on an already-bound listener. Binding is the host's job
/// and its only fatal failure mode.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}
