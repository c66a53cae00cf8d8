pub mod error;
pub mod http;
pub mod router;
pub mod state;
pub mod transport;

pub use error::RelayError;
pub use http::{AppState, serve, signaling_routes};
pub use router::{EventSink, RelayStats, SignalingRouter};
pub use state::{ConnectionRegistry, RelayState, RoomDirectory};
pub use transport::{ConnectionMap, TransportConfig};
