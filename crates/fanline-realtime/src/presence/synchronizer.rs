use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use fanline_core::config::RealtimeConfig;
use fanline_core::result::AppResult;
use fanline_core::traits::UserDirectory;
use fanline_entity::CreatorSummary;

use crate::connection::ConnectionRegistry;
use crate::event::ServerEvent;
use crate::gateway::Emitter;
use crate::presence::ActivityTracker;
use crate::room::PRESENCE_ROOM;

/// Keeps the persisted online flag, the connection registry and the
/// broadcast surface in agreement.
///
/// Transitions are edge-triggered: the directory's `set_online` reports
/// whether the flag actually flipped, and only a flip produces
/// broadcasts. Quick reconnects inside the grace window produce no
/// offline edge at all.
#[derive(Debug)]
pub struct PresenceSynchronizer {
    users: Arc<dyn UserDirectory>,
    registry: Arc<ConnectionRegistry>,
    activity: Arc<ActivityTracker>,
    emitter: Emitter,
    grace: Duration,
    stale_threshold: chrono::Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl PresenceSynchronizer {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        registry: Arc<ConnectionRegistry>,
        activity: Arc<ActivityTracker>,
        emitter: Emitter,
        config: &RealtimeConfig,
    ) -> Self {
        Self {
            users,
            registry,
            activity,
            emitter,
            grace: Duration::from_millis(config.disconnect_grace_ms),
            stale_threshold: chrono::Duration::seconds(config.stale_threshold_seconds as i64),
            retry_attempts: config.presence_retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.presence_retry_delay_ms),
        }
    }

    /// First connection for a user arrived. Flips the persisted flag
    /// and, only if it flipped, announces the user and refreshes the
    /// creator roster.
    pub async fn on_connect(&self, user_id: Uuid) {
        match self.users.set_online(user_id, true).await {
            Ok(true) => {
                info!(user_id = %user_id, "User online");
                self.announce(&ServerEvent::UserOnline { user_id });
                self.refresh_creators().await;
            }
            Ok(false) => debug!(user_id = %user_id, "Online flag already set"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to mark user online"),
        }
    }

    /// Last connection for a user dropped. Waits out the grace window
    /// and re-checks the registry before demoting, so a page refresh
    /// never flaps presence.
    pub fn schedule_offline(self: &Arc<Self>, user_id: Uuid) {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(sync.grace).await;
            if sync.registry.is_user_connected(user_id) {
                debug!(user_id = %user_id, "Reconnected within grace window");
                return;
            }
            sync.go_offline(user_id).await;
        });
    }

    pub(crate) async fn go_offline(&self, user_id: Uuid) {
        match self.users.set_online(user_id, false).await {
            Ok(true) => {
                info!(user_id = %user_id, "User offline");
                self.announce(&ServerEvent::UserOffline { user_id });
                self.refresh_creators().await;
            }
            Ok(false) => debug!(user_id = %user_id, "Online flag already clear"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to mark user offline"),
        }
        self.activity.remove(user_id);
    }

    /// Users whose activity entry has gone quiet past the stale
    /// threshold. The engine owns tearing their connections down.
    pub(crate) fn stale_users(&self) -> Vec<Uuid> {
        self.activity.stale_user_ids(self.stale_threshold)
    }

    /// Current online creator roster, retried a bounded number of times
    /// on transient failure.
    pub async fn online_creators(&self) -> AppResult<Vec<CreatorSummary>> {
        let mut attempt = 1;
        loop {
            match self.users.online_creators().await {
                Ok(creators) => return Ok(creators),
                Err(e) if attempt < self.retry_attempts && e.is_transient() => {
                    warn!(attempt, error = %e, "Creator roster fetch failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn refresh_creators(&self) {
        match self.online_creators().await {
            Ok(creators) => {
                self.announce(&ServerEvent::OnlineCreators { creators });
            }
            Err(e) => warn!(error = %e, "Skipping creator roster broadcast"),
        }
    }

    fn announce(&self, event: &ServerEvent) {
        // Every connection joins the presence room at attach, so the
        // room broadcast is the global broadcast. Emitting through the
        // room keeps each transition to one delivery per connection.
        self.emitter.broadcast_to_room(PRESENCE_ROOM, event);
    }
}
