//! Realtime core: connection registry, presence synchronization,
//! notification fan-out, call signaling and the emission gateway.
//!
//! Everything here is transport-agnostic. The API crate owns the
//! WebSocket upgrade and pumps frames in and out through
//! [`engine::RealtimeEngine`]; this crate owns what those frames mean.

pub mod call;
pub mod connection;
pub mod engine;
pub mod event;
pub mod gateway;
pub mod notification;
pub mod presence;
pub mod room;

pub use engine::RealtimeEngine;
pub use event::{ClientEvent, ServerEvent};
