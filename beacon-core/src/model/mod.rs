mod event;
mod ids;

pub use event::{ClientEvent, ServerEvent};
pub use ids::{ConnectionId, RoomId, UserId};
