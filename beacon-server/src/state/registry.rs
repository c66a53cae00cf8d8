use beacon_core::{ConnectionId, RoomId, UserId};
use std::collections::HashMap;

/// What a connection currently represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub user_id: UserId,
    pub room_id: RoomId,
}

/// Maps live transport connections to the (user, room) they represent.
///
/// Pure map mutation, no I/O. A reverse index lets the router resolve a
/// room member back to its connection without scanning.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_connection: HashMap<ConnectionId, Binding>,
    by_member: HashMap<(RoomId, UserId), ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a connection with a user/room pair, replacing any prior
    /// binding for that connection. Returns the binding it replaced, if
    /// any, so the caller can sequence the implicit leave of the old room.
    pub fn record(
        &mut self,
        connection_id: ConnectionId,
        user_id: UserId,
        room_id: RoomId,
    ) -> Option<Binding> {
        let previous = self.forget(connection_id);
        self.by_member
            .insert((room_id.clone(), user_id.clone()), connection_id);
        self.by_connection
            .insert(connection_id, Binding { user_id, room_id });
        previous
    }

    pub fn lookup(&self, connection_id: ConnectionId) -> Option<&Binding> {
        self.by_connection.get(&connection_id)
    }

    /// Drop the binding for a connection. Idempotent.
    pub fn forget(&mut self, connection_id: ConnectionId) -> Option<Binding> {
        let binding = self.by_connection.remove(&connection_id)?;
        let key = (binding.room_id.clone(), binding.user_id.clone());
        // Another connection may have since claimed the same (room, user);
        // the reverse entry is only ours to remove while it still points at
        // the connection being forgotten.
        if self.by_member.get(&key) == Some(&connection_id) {
            self.by_member.remove(&key);
        }
        Some(binding)
    }

    /// Whether this connection is the room's current representative for the
    /// user it is bound as. False once a newer connection has claimed the
    /// same (room, user) pair.
    pub fn is_current(&self, connection_id: ConnectionId) -> bool {
        self.by_connection.get(&connection_id).is_some_and(|b| {
            self.by_member.get(&(b.room_id.clone(), b.user_id.clone())) == Some(&connection_id)
        })
    }

    /// Connection currently representing `user_id` inside `room_id`.
    pub fn connection_for(&self, room_id: &RoomId, user_id: &UserId) -> Option<ConnectionId> {
        self.by_member
            .get(&(room_id.clone(), user_id.clone()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_connection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_connection.is_empty()
    }
}
