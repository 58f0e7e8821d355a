//! WebRTC call signaling.

mod coordinator;

pub use coordinator::{CallCoordinator, HandshakeKind, SignalKind};
