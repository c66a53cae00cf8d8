use beacon_core::{ConnectionId, ServerEvent};

/// Outbound delivery seam between the router and whatever transport is
/// carrying a connection. Implementations must be fire-and-forget: a dead
/// or slow target is that target's problem, never the router's.
pub trait EventSink: Send + Sync {
    fn deliver(&self, target: ConnectionId, event: ServerEvent);
}
