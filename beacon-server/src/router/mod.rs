mod sink;

pub use sink::EventSink;

use crate::error::RelayError;
use crate::state::RelayState;
use beacon_core::{ClientEvent, ConnectionId, RoomId, ServerEvent, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Counters for events the relay absorbed instead of forwarding.
#[derive(Debug, Default)]
pub struct RelayStats {
    protocol_errors: AtomicU64,
    state_errors: AtomicU64,
}

impl RelayStats {
    pub fn count_protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_errors(&self) -> u64 {
        self.protocol_errors.load(Ordering::Relaxed)
    }

    pub fn state_errors(&self) -> u64 {
        self.state_errors.load(Ordering::Relaxed)
    }

    fn count_state_error(&self) {
        self.state_errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// The event-driven core of the relay.
///
/// Owns registry and directory behind one lock: each event is applied to
/// completion against that shared view before the next is admitted, and the
/// two structures can never drift apart. Nothing here suspends while the
/// lock is held; fan-out is computed under the lock and delivered after it
/// is released, one fire-and-forget send per recipient.
///
/// Routing is room-broadcast. Relayed events carry a `to` field but it is
/// never used for filtering: every other member of the room receives the
/// event and receivers discard what is not addressed to them.
pub struct SignalingRouter {
    state: Mutex<RelayState>,
    sink: Arc<dyn EventSink>,
    stats: RelayStats,
}

impl SignalingRouter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            sink,
            stats: RelayStats::default(),
        }
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// (active connections, live rooms) for the status payload.
    pub fn occupancy(&self) -> (usize, usize) {
        let state = self.state.lock().expect("relay state poisoned");
        (state.registry.len(), state.directory.len())
    }

    /// Snapshot of a room's member set; empty for an unknown room.
    pub fn room_members(&self, room_id: &RoomId) -> std::collections::HashSet<UserId> {
        self.state
            .lock()
            .expect("relay state poisoned")
            .directory
            .members(room_id)
    }

    /// Apply one inbound event from `connection_id`. State errors are
    /// dropped here: counted, traced, never forwarded, never fatal to the
    /// connection or its neighbours.
    pub fn handle_event(&self, connection_id: ConnectionId, event: ClientEvent) {
        let deliveries = match event {
            ClientEvent::Join { room_id, user_id } => self.on_join(connection_id, room_id, user_id),
            ClientEvent::Leave { room_id, .. } => self.on_leave(connection_id, room_id),
            relay => self.on_relay(connection_id, relay),
        };

        match deliveries {
            Ok(deliveries) => {
                for (target, event) in deliveries {
                    self.sink.deliver(target, event);
                }
            }
            Err(err) => {
                self.stats.count_state_error();
                debug!(connection = %connection_id, %err, "dropped event");
            }
        }
    }

    /// Transport-level disconnect, graceful or abrupt: same cleanup as an
    /// explicit leave for whatever the connection was bound to.
    pub fn handle_disconnect(&self, connection_id: ConnectionId) {
        let deliveries = {
            let mut state = self.state.lock().expect("relay state poisoned");
            let was_current = state.registry.is_current(connection_id);
            let Some(binding) = state.registry.forget(connection_id) else {
                return;
            };
            // A stale binding (another connection has since claimed the
            // same identity) is forgotten without touching the directory:
            // the user is still present through the newer connection.
            if !was_current {
                debug!(connection = %connection_id, user = %binding.user_id, room = %binding.room_id, "stale connection disconnected");
                return;
            }
            state.directory.leave(&binding.room_id, &binding.user_id);
            info!(connection = %connection_id, user = %binding.user_id, room = %binding.room_id, "disconnected");
            self.departure_notices(&state, &binding.room_id, binding.user_id)
        };

        for (target, event) in deliveries {
            self.sink.deliver(target, event);
        }
    }

    fn on_join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Vec<(ConnectionId, ServerEvent)>, RelayError> {
        let mut state = self.state.lock().expect("relay state poisoned");
        let mut deliveries = Vec::new();

        // One room per connection: a second join vacates the old room
        // first, unless a newer connection already represents that
        // identity there, in which case the old room keeps its member.
        let previous = state.registry.lookup(connection_id).cloned();
        let previous_current = state.registry.is_current(connection_id);
        state
            .registry
            .record(connection_id, user_id.clone(), room_id.clone());
        if let Some(previous) = previous
            && previous_current
            && (previous.room_id != room_id || previous.user_id != user_id)
        {
            state.directory.leave(&previous.room_id, &previous.user_id);
            deliveries.extend(self.departure_notices(
                &state,
                &previous.room_id,
                previous.user_id,
            ));
        }

        state.directory.join(room_id.clone(), user_id.clone());
        info!(connection = %connection_id, user = %user_id, room = %room_id, "joined");

        deliveries.push((
            connection_id,
            ServerEvent::Joined {
                room_id: room_id.clone(),
            },
        ));
        // A redundant re-join still announces itself; membership above was
        // a no-op but peers are notified exactly as the first time.
        for member in state.directory.members(&room_id) {
            if member == user_id {
                continue;
            }
            if let Some(target) = state.registry.connection_for(&room_id, &member) {
                deliveries.push((
                    target,
                    ServerEvent::UserJoined {
                        user_id: user_id.clone(),
                    },
                ));
            }
        }

        Ok(deliveries)
    }

    fn on_leave(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<Vec<(ConnectionId, ServerEvent)>, RelayError> {
        let mut state = self.state.lock().expect("relay state poisoned");

        match state.registry.lookup(connection_id) {
            Some(binding) if binding.room_id == room_id => {}
            Some(_) => return Err(RelayError::NotInRoom { room_id }),
            None => return Err(RelayError::NotJoined),
        }

        let was_current = state.registry.is_current(connection_id);
        let binding = state
            .registry
            .forget(connection_id)
            .ok_or(RelayError::NotJoined)?;
        if !was_current {
            debug!(connection = %connection_id, user = %binding.user_id, room = %binding.room_id, "stale connection left");
            return Ok(Vec::new());
        }
        state.directory.leave(&binding.room_id, &binding.user_id);
        info!(connection = %connection_id, user = %binding.user_id, room = %binding.room_id, "left");

        Ok(self.departure_notices(&state, &binding.room_id, binding.user_id))
    }

    fn on_relay(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<Vec<(ConnectionId, ServerEvent)>, RelayError> {
        let room_id = event.room_id().clone();

        let (sender, targets) = {
            let state = self.state.lock().expect("relay state poisoned");
            let sender = match state.registry.lookup(connection_id) {
                Some(binding) if binding.room_id == room_id => binding.user_id.clone(),
                Some(_) => return Err(RelayError::NotInRoom { room_id }),
                None => return Err(RelayError::NotJoined),
            };

            let targets: Vec<ConnectionId> = state
                .directory
                .members(&room_id)
                .into_iter()
                .filter(|member| *member != sender)
                .filter_map(|member| state.registry.connection_for(&room_id, &member))
                .collect();
            (sender, targets)
        };

        // `from` is stamped with the registered identity, whatever the
        // client put in the frame.
        let Some(relayed) = event.into_relay(sender) else {
            return Ok(Vec::new());
        };

        Ok(targets
            .into_iter()
            .map(|target| (target, relayed.clone()))
            .collect())
    }

    /// `user-left` for every remaining member of `room_id`. Callers have
    /// already removed the departing user from both structures.
    fn departure_notices(
        &self,
        state: &RelayState,
        room_id: &RoomId,
        user_id: UserId,
    ) -> Vec<(ConnectionId, ServerEvent)> {
        state
            .directory
            .members(room_id)
            .into_iter()
            .filter_map(|member| state.registry.connection_for(room_id, &member))
            .map(|target| {
                (
                    target,
                    ServerEvent::UserLeft {
                        user_id: user_id.clone(),
                    },
                )
            })
            .collect()
    }
}
