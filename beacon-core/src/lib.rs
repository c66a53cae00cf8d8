pub mod model;

pub use model::{ClientEvent, ConnectionId, RoomId, ServerEvent, UserId};
