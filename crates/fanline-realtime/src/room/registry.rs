use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

/// Room membership with a reverse index so a disconnecting connection
/// can be pulled out of everything it joined in one call.
///
/// Invariant: a room key exists iff the room has at least one member,
/// and the reverse index mirrors the forward map exactly.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashSet<ConnectionId>>,
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Returns the member count after the
    /// join. Joining a room twice is a no-op.
    pub fn join(&self, room: &str, connection_id: ConnectionId) -> usize {
        let mut members = self.rooms.entry(room.to_string()).or_default();
        members.insert(connection_id);
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(room.to_string());
        members.len()
    }

    /// Remove a connection from a room. Returns the member count after
    /// the leave. Empty rooms are dropped.
    pub fn leave(&self, room: &str, connection_id: ConnectionId) -> usize {
        let remaining = match self.rooms.get_mut(room) {
            Some(mut members) => {
                members.remove(&connection_id);
                members.len()
            }
            None => 0,
        };
        if remaining == 0 {
            self.rooms.remove_if(room, |_, members| members.is_empty());
        }
        if let Some(mut joined) = self.memberships.get_mut(&connection_id) {
            joined.remove(room);
        }
        self.memberships
            .remove_if(&connection_id, |_, joined| joined.is_empty());
        remaining
    }

    /// Remove a connection from every room it joined. Returns each
    /// vacated room and its remaining member count.
    pub fn leave_all(&self, connection_id: ConnectionId) -> Vec<(String, usize)> {
        let joined = match self.memberships.remove(&connection_id) {
            Some((_, joined)) => joined,
            None => return Vec::new(),
        };
        let mut vacated = Vec::with_capacity(joined.len());
        for room in joined {
            let remaining = match self.rooms.get_mut(&room) {
                Some(mut members) => {
                    members.remove(&connection_id);
                    members.len()
                }
                None => 0,
            };
            if remaining == 0 {
                self.rooms.remove_if(&room, |_, members| members.is_empty());
            }
            vacated.push((room, remaining));
        }
        vacated
    }

    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_member(&self, room: &str, connection_id: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|m| m.contains(&connection_id))
    }

    pub fn rooms_of(&self, connection_id: ConnectionId) -> Vec<String> {
        self.memberships
            .get(&connection_id)
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn join_and_leave_track_counts() {
        let rooms = RoomRegistry::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(rooms.join("call-1", a), 1);
        assert_eq!(rooms.join("call-1", b), 2);
        assert_eq!(rooms.leave("call-1", a), 1);
        assert_eq!(rooms.leave("call-1", b), 0);
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn double_join_is_idempotent() {
        let rooms = RoomRegistry::new();
        let a = Uuid::new_v4();
        assert_eq!(rooms.join("call-1", a), 1);
        assert_eq!(rooms.join("call-1", a), 1);
        assert_eq!(rooms.members("call-1"), vec![a]);
    }

    #[test]
    fn leave_all_vacates_every_room() {
        let rooms = RoomRegistry::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        rooms.join("call-1", a);
        rooms.join("call-2", a);
        rooms.join("call-2", b);

        let mut vacated = rooms.leave_all(a);
        vacated.sort();
        assert_eq!(vacated, vec![("call-1".to_string(), 0), ("call-2".to_string(), 1)]);
        assert_eq!(rooms.room_count(), 1);
        assert!(rooms.rooms_of(a).is_empty());
        assert!(rooms.is_member("call-2", b));
    }

    #[test]
    fn leaving_unknown_room_is_harmless() {
        let rooms = RoomRegistry::new();
        assert_eq!(rooms.leave("ghost", Uuid::new_v4()), 0);
        assert!(rooms.leave_all(Uuid::new_v4()).is_empty());
    }
}
