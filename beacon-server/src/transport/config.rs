use std::time::Duration;

/// Tuning knobs for both transports. Liveness is inferred purely from
/// keep-alive: a connection silent past `keepalive_timeout` is treated the
/// same as an abrupt disconnect.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// How often the server pings a WebSocket / sweeps poll sessions.
    pub keepalive_interval: Duration,
    /// Silence threshold after which a connection is considered dead.
    pub keepalive_timeout: Duration,
    /// How long a long-poll request parks before returning an empty batch.
    pub poll_window: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(15),
            keepalive_timeout: Duration::from_secs(45),
            poll_window: Duration::from_secs(25),
        }
    }
}
