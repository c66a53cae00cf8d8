use beacon_core::RoomId;
use thiserror::Error;

/// Faults the relay absorbs. None of these tear down a connection, let
/// alone the process; they are counted, traced and dropped at the point of
/// origin. The only fatal condition lives outside this crate: failing to
/// bind the listener in the hosting process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Frame arrived but did not decode into a signaling event.
    #[error("malformed signaling frame: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Event from a connection that never joined a room.
    #[error("connection has not joined a room")]
    NotJoined,

    /// Event names a room other than the one the connection is bound to.
    #[error("connection is not a member of room '{room_id}'")]
    NotInRoom { room_id: RoomId },
}
