//! Connection tracking.

mod handle;
mod heartbeat;
mod registry;

pub use handle::{ConnectionHandle, ConnectionId};
pub use heartbeat::spawn_heartbeat;
pub use registry::ConnectionRegistry;
