//! Emission gateway: lets code outside the realtime engine (REST
//! handlers, background jobs) push events to connected clients without
//! holding a reference to the engine.
//!
//! Every emission is fail-soft. When the gateway has not been
//! initialized yet, or a target has no live connections, the call logs
//! and returns false instead of erroring; realtime delivery is never
//! allowed to fail a request.

use std::sync::Arc;
use std::sync::OnceLock;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::connection::ConnectionRegistry;
use crate::event::ServerEvent;
use crate::room::{user_room, RoomRegistry};

/// Delivery primitives over the shared registries. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Emitter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
}

impl Emitter {
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomRegistry>) -> Self {
        Self { registry, rooms }
    }

    /// Deliver to every live connection. Returns connections reached.
    pub fn broadcast_all(&self, event: &ServerEvent) -> usize {
        self.registry.broadcast_all(event)
    }

    /// Deliver to every member of a room.
    pub fn broadcast_to_room(&self, room: &str, event: &ServerEvent) -> usize {
        let members = self.rooms.members(room);
        self.registry.send_to_connections(&members, event)
    }

    /// Deliver to one user. The reserved per-user room is the primary
    /// path; the direct per-user index is the fallback for connections
    /// that missed the room join, so no connection sees a duplicate.
    pub fn broadcast_to_user(&self, user_id: Uuid, event: &ServerEvent) -> usize {
        let via_room = self.broadcast_to_room(&user_room(user_id), event);
        if via_room > 0 {
            return via_room;
        }
        self.registry.send_to_user(user_id, event)
    }
}

static GATEWAY: OnceLock<Emitter> = OnceLock::new();

/// Install the process-wide emitter. Called once at startup after the
/// engine is built; a second call is ignored with a warning.
pub fn init(emitter: Emitter) {
    if GATEWAY.set(emitter).is_err() {
        warn!("Emission gateway already initialized");
    }
}

fn emitter() -> Option<&'static Emitter> {
    let found = GATEWAY.get();
    if found.is_none() {
        error!("Emission gateway used before initialization");
    }
    found
}

/// Broadcast to all connections. Returns true if the emission was
/// attempted against a live gateway.
pub fn broadcast_all(event: &ServerEvent) -> bool {
    match emitter() {
        Some(e) => {
            let reached = e.broadcast_all(event);
            debug!(reached, "Gateway broadcast");
            true
        }
        None => false,
    }
}

/// Broadcast to a room's members.
pub fn broadcast_to_room(room: &str, event: &ServerEvent) -> bool {
    match emitter() {
        Some(e) => {
            let reached = e.broadcast_to_room(room, event);
            debug!(room, reached, "Gateway room broadcast");
            true
        }
        None => false,
    }
}

/// Broadcast to all of a user's connections.
pub fn broadcast_to_user(user_id: Uuid, event: &ServerEvent) -> bool {
    match emitter() {
        Some(e) => {
            let reached = e.broadcast_to_user(user_id, event);
            debug!(user_id = %user_id, reached, "Gateway user broadcast");
            true
        }
        None => false,
    }
}
