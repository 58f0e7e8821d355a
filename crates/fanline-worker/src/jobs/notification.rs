use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use fanline_core::result::AppResult;
use fanline_core::traits::NotificationStore;

use crate::scheduler::Job;

/// Prunes notifications that have been read for longer than the
/// retention window. Unread notifications are never touched.
pub struct RetentionSweepJob {
    store: Arc<dyn NotificationStore>,
    retention: chrono::Duration,
    interval: Duration,
}

impl RetentionSweepJob {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        retention: chrono::Duration,
        interval: Duration,
    ) -> Self {
        Self { store, retention, interval }
    }
}

#[async_trait]
impl Job for RetentionSweepJob {
    fn name(&self) -> &'static str {
        "notification-retention"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> AppResult<()> {
        let cutoff = Utc::now() - self.retention;
        let deleted = self.store.delete_read_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, "Read notifications pruned");
        }
        Ok(())
    }
}
