use crate::router::EventSink;
use beacon_core::{ConnectionId, ServerEvent};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Live outbound channels, one per connection, shared by both transports.
/// The router only ever sees connection ids; which transport is behind a
/// given sender is invisible to it.
#[derive(Debug, Default)]
pub struct ConnectionMap {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<ServerEvent>) {
        self.connections.insert(connection_id, tx);
    }

    pub fn remove(&self, connection_id: &ConnectionId) {
        self.connections.remove(connection_id);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl EventSink for ConnectionMap {
    fn deliver(&self, target: ConnectionId, event: ServerEvent) {
        let Some(tx) = self.connections.get(&target) else {
            // Target vanished between lookup and send; the remaining
            // recipients of the same broadcast are unaffected.
            debug!(connection = %target, "delivery skipped, connection gone");
            return;
        };
        if tx.send(event).is_err() {
            debug!(connection = %target, "delivery skipped, channel closed");
        }
    }
}
