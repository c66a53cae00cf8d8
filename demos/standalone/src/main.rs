use axum::Router;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use beacon_server::{AppState, TransportConfig, serve, signaling_routes};

/// Minimal hosting process. In production the relay is nested into a larger
/// HTTP application that also terminates TLS and serves its other routes;
/// here the host does nothing but bind, allow CORS and mount the relay.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let addr: SocketAddr = env::var("BEACON_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .expect("BEACON_ADDR is not a valid socket address");

    let state = AppState::new(TransportConfig::default());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/signaling", signaling_routes(state))
        .layer(cors);

    info!("signaling relay listening on http://{}", addr);

    // Failing to bind is the one fatal error at this layer.
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    serve(listener, app).await.expect("server error");
}
