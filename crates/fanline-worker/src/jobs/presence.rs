use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use fanline_core::result::AppResult;
use fanline_realtime::RealtimeEngine;

use crate::scheduler::Job;

/// Demotes users whose activity has gone quiet past the stale
/// threshold. Catches half-open transports that never delivered a
/// close frame; the engine tears the dead connections out of their
/// rooms the same way a normal disconnect does.
pub struct PresenceSweepJob {
    engine: Arc<RealtimeEngine>,
    interval: Duration,
}

impl PresenceSweepJob {
    pub fn new(engine: Arc<RealtimeEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }
}

#[async_trait]
impl Job for PresenceSweepJob {
    fn name(&self) -> &'static str {
        "presence-sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> AppResult<()> {
        let swept = self.engine.sweep_stale().await;
        if swept > 0 {
            info!(swept, "Stale presence entries demoted");
        }
        Ok(())
    }
}
