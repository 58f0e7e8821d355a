use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::event::ServerEvent;

/// Process-wide registry of live connections, indexed both by user and
/// by connection id.
///
/// Invariant: a user key exists in `by_user` iff that user has at least
/// one live connection. `active_user_ids` relies on this.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection. Returns true when this is the user's first
    /// live connection (the offline-to-online edge).
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> bool {
        self.by_id.insert(handle.id, Arc::clone(&handle));
        let mut entry = self.by_user.entry(handle.user_id).or_default();
        let first = entry.is_empty();
        entry.push(handle);
        first
    }

    /// Detach a connection. Returns the handle and whether the user has
    /// no remaining connections (the online-to-offline candidate edge).
    pub fn deregister(&self, connection_id: ConnectionId) -> Option<(Arc<ConnectionHandle>, bool)> {
        let (_, handle) = self.by_id.remove(&connection_id)?;
        let mut now_empty = false;
        if let Some(mut entry) = self.by_user.get_mut(&handle.user_id) {
            entry.retain(|c| c.id != connection_id);
            now_empty = entry.is_empty();
        }
        if now_empty {
            self.by_user.remove(&handle.user_id);
        }
        debug!(connection_id = %connection_id, user_id = %handle.user_id, now_empty, "Connection deregistered");
        Some((handle, now_empty))
    }

    pub fn get(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&connection_id).map(|c| Arc::clone(&c))
    }

    pub fn is_user_connected(&self, user_id: Uuid) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn user_connections(&self, user_id: Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|conns| conns.iter().map(Arc::clone).collect())
            .unwrap_or_default()
    }

    /// Snapshot of all users with at least one live connection.
    pub fn active_user_ids(&self) -> Vec<Uuid> {
        self.by_user.iter().map(|e| *e.key()).collect()
    }

    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Deliver to every connection of one user. Returns how many
    /// connections accepted the event.
    pub fn send_to_user(&self, user_id: Uuid, event: &ServerEvent) -> usize {
        match self.by_user.get(&user_id) {
            Some(conns) => conns.iter().filter(|c| c.send(event.clone())).count(),
            None => 0,
        }
    }

    pub fn send_to_connection(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        match self.by_id.get(&connection_id) {
            Some(conn) => conn.send(event),
            None => false,
        }
    }

    /// Deliver to an explicit set of connections.
    pub fn send_to_connections(&self, ids: &[ConnectionId], event: &ServerEvent) -> usize {
        ids.iter()
            .filter(|id| self.send_to_connection(**id, event.clone()))
            .count()
    }

    /// Deliver to every live connection in the process.
    pub fn broadcast_all(&self, event: &ServerEvent) -> usize {
        self.by_id
            .iter()
            .filter(|c| c.send(event.clone()))
            .count()
    }
}
