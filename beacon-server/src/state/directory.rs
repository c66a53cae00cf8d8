use beacon_core::{RoomId, UserId};
use std::collections::{HashMap, HashSet};

/// Maps rooms to their current member sets.
///
/// Rooms come into existence on the first `join` that names them and are
/// deleted the moment their last member leaves; an empty room never
/// persists. Both transitions live here and nowhere else.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomId, HashSet<UserId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `user_id` to the room, creating it if absent. Returns whether
    /// membership actually changed (false for a redundant re-join).
    pub fn join(&mut self, room_id: RoomId, user_id: UserId) -> bool {
        self.rooms.entry(room_id).or_default().insert(user_id)
    }

    /// Remove `user_id`; deletes the room when it empties. No-op (false)
    /// for an unknown room or a non-member.
    pub fn leave(&mut self, room_id: &RoomId, user_id: &UserId) -> bool {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = members.remove(user_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    /// Current members, empty for an unknown room.
    pub fn members(&self, room_id: &RoomId) -> HashSet<UserId> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
