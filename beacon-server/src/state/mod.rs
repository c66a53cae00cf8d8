mod directory;
mod registry;

pub use directory::RoomDirectory;
pub use registry::{Binding, ConnectionRegistry};

/// Registry and directory as one unit. The router mutates both under a
/// single lock so they can never disagree about who is where.
#[derive(Debug, Default)]
pub struct RelayState {
    pub registry: ConnectionRegistry,
    pub directory: RoomDirectory,
}
