use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use fanline_core::traits::UserDirectory;

use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::event::ServerEvent;
use crate::gateway::Emitter;
use crate::room::{is_call_room, validate_room_name, RoomRegistry};

/// SDP and ICE payload relays. The payload is opaque to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// Pre-call handshake events, delivered user-to-user rather than
/// room-to-room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    Accepted,
    Declined,
    Canceled,
}

/// Coordinates call rooms and relays signaling payloads between their
/// members without inspecting them.
#[derive(Debug)]
pub struct CallCoordinator {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    users: Arc<dyn UserDirectory>,
    emitter: Emitter,
}

impl CallCoordinator {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomRegistry>,
        users: Arc<dyn UserDirectory>,
        emitter: Emitter,
    ) -> Self {
        Self { registry, rooms, users, emitter }
    }

    /// Join a call room: the joiner gets the current participant list,
    /// everyone already there gets the arrival.
    pub fn join(&self, connection_id: ConnectionId, room: &str) {
        if let Err(reason) = validate_room_name(room) {
            warn!(connection_id = %connection_id, room, reason, "Rejected call room join");
            self.registry
                .send_to_connection(connection_id, ServerEvent::error("call", reason));
            return;
        }

        let total = self.rooms.join(room, connection_id);
        let others: Vec<ConnectionId> = self
            .rooms
            .members(room)
            .into_iter()
            .filter(|id| *id != connection_id)
            .collect();

        debug!(connection_id = %connection_id, room, total, "Joined call room");
        self.registry.send_to_connection(
            connection_id,
            ServerEvent::RoomJoined {
                room: room.to_string(),
                participants: others.clone(),
                total_participants: total,
            },
        );
        self.registry.send_to_connections(
            &others,
            &ServerEvent::UserJoined {
                id: connection_id,
                total_participants: total,
            },
        );
    }

    /// Leave a call room and tell the remaining members.
    pub fn leave(&self, connection_id: ConnectionId, room: &str) {
        if validate_room_name(room).is_err() {
            return;
        }
        let remaining = self.rooms.leave(room, connection_id);
        self.notify_departure(connection_id, room, remaining);
    }

    /// Pull a disconnecting connection out of every call room it was
    /// in, announcing each departure.
    pub fn cleanup_on_disconnect(&self, connection_id: ConnectionId) {
        for (room, remaining) in self.rooms.leave_all(connection_id) {
            if is_call_room(&room) {
                self.notify_departure(connection_id, &room, remaining);
            }
        }
    }

    /// Relay an SDP or ICE payload. With a target it goes to exactly
    /// that connection; without one it goes to every other room member.
    /// The payload passes through untouched.
    pub fn relay(
        &self,
        from: ConnectionId,
        kind: SignalKind,
        room: &str,
        payload: Value,
        to: Option<ConnectionId>,
    ) {
        if validate_room_name(room).is_err() || payload.is_null() {
            self.registry
                .send_to_connection(from, ServerEvent::error("call", "Invalid signaling payload"));
            return;
        }
        if !self.rooms.is_member(room, from) {
            self.registry
                .send_to_connection(from, ServerEvent::error("call", "Not a member of this room"));
            return;
        }

        let event = match kind {
            SignalKind::Offer => ServerEvent::Offer { offer: payload, from },
            SignalKind::Answer => ServerEvent::Answer { answer: payload, from },
            SignalKind::IceCandidate => ServerEvent::IceCandidate { candidate: payload, from },
        };

        match to {
            Some(target) => {
                self.registry.send_to_connection(target, event);
            }
            None => {
                let others: Vec<ConnectionId> = self
                    .rooms
                    .members(room)
                    .into_iter()
                    .filter(|id| *id != from)
                    .collect();
                self.registry.send_to_connections(&others, &event);
            }
        }
    }

    /// Invite a user into a call, carrying the caller's display data so
    /// the callee can render the incoming-call screen.
    pub async fn invite(&self, from_user: Uuid, to_user: Uuid, room: String) {
        let caller = match self.users.sender_summary(from_user).await {
            Ok(caller) => caller,
            Err(e) => {
                warn!(user_id = %from_user, error = %e, "Caller lookup failed, inviting anyway");
                None
            }
        };
        let reached = self.emitter.broadcast_to_user(
            to_user,
            &ServerEvent::CallInvitation { from: from_user, caller, room },
        );
        if reached == 0 {
            debug!(to_user = %to_user, "Call invitation target has no live connections");
        }
    }

    /// Accepted / declined / canceled responses back to the other side.
    pub fn respond(&self, kind: HandshakeKind, from_user: Uuid, to_user: Uuid, room: String) {
        let event = match kind {
            HandshakeKind::Accepted => ServerEvent::CallAccepted { from: from_user, room },
            HandshakeKind::Declined => ServerEvent::CallDeclined { from: from_user, room },
            HandshakeKind::Canceled => ServerEvent::CallCanceled { from: from_user, room },
        };
        self.emitter.broadcast_to_user(to_user, &event);
    }

    /// Mute state change, announced to the rest of the room.
    pub fn toggle_mute(&self, connection_id: ConnectionId, room: &str, muted: bool) {
        self.announce_to_others(
            connection_id,
            room,
            ServerEvent::ParticipantMuted { id: connection_id, muted },
        );
    }

    /// Camera state change, announced to the rest of the room.
    pub fn toggle_video(&self, connection_id: ConnectionId, room: &str, video_enabled: bool) {
        self.announce_to_others(
            connection_id,
            room,
            ServerEvent::ParticipantVideoChanged { id: connection_id, video_enabled },
        );
    }

    /// Unstructured room broadcasts for call timing and cooldown. The
    /// data blob is forwarded as-is.
    pub fn broadcast_time_warning(&self, connection_id: ConnectionId, room: &str, data: Value) {
        self.announce_to_others(connection_id, room, ServerEvent::CallTimeWarning { data });
    }

    pub fn broadcast_time_exceeded(&self, connection_id: ConnectionId, room: &str, data: Value) {
        self.announce_to_others(connection_id, room, ServerEvent::CallTimeExceeded { data });
    }

    pub fn broadcast_cooldown_set(&self, connection_id: ConnectionId, room: &str, data: Value) {
        self.announce_to_others(connection_id, room, ServerEvent::CallCooldownSet { data });
    }

    fn announce_to_others(&self, from: ConnectionId, room: &str, event: ServerEvent) {
        if validate_room_name(room).is_err() || !self.rooms.is_member(room, from) {
            return;
        }
        let others: Vec<ConnectionId> = self
            .rooms
            .members(room)
            .into_iter()
            .filter(|id| *id != from)
            .collect();
        self.registry.send_to_connections(&others, &event);
    }

    fn notify_departure(&self, connection_id: ConnectionId, room: &str, remaining: usize) {
        debug!(connection_id = %connection_id, room, remaining, "Left call room");
        let members = self.rooms.members(room);
        self.registry.send_to_connections(
            &members,
            &ServerEvent::UserLeft {
                id: connection_id,
                total_participants: remaining,
            },
        );
    }
}
