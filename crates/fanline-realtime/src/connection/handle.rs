use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::event::ServerEvent;

/// Transport-assigned opaque connection identifier. Distinct from the
/// user id: one user may hold several of these at once.
pub type ConnectionId = Uuid;

/// A single live transport attachment for a user.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub user_id: Uuid,
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<ServerEvent>,
    closed: AtomicBool,
}

impl ConnectionHandle {
    pub fn new(user_id: Uuid, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Queue an event for this connection. Returns false if the outbound
    /// buffer is full or the transport side has gone away; a full buffer
    /// drops the event rather than blocking the caller.
    pub fn send(&self, event: ServerEvent) -> bool {
        if self.closed.load(Ordering::Relaxed) {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(connection_id = %self.id, user_id = %self.user_id, "Outbound buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.closed.store(true, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}
