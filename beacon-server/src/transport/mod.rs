mod config;
mod connections;
mod polling;
mod ws;

pub use config::TransportConfig;
pub use connections::ConnectionMap;
pub use polling::{PollSessions, close_session, open_session, poll_session, submit_events};
pub(crate) use polling::spawn_reaper;
pub use ws::ws_handler;
