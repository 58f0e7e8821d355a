//! Interval scheduling with cooperative shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use fanline_core::result::AppResult;

/// A periodically executed background job.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn interval(&self) -> Duration;
    async fn run(&self) -> AppResult<()>;
}

/// Runs each registered job on its own interval until shutdown is
/// signalled. A failing run is logged and the schedule keeps going.
pub struct Scheduler {
    jobs: Vec<Arc<dyn Job>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn register(mut self, job: Arc<dyn Job>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Spawn one task per job. Each loop exits when `shutdown` flips to
    /// true.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|job| {
                let mut shutdown = shutdown.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(job.interval());
                    ticker.tick().await;
                    info!(job = job.name(), "Job schedule started");
                    loop {
                        tokio::select! {
                            _ = ticker.tick() => {
                                if let Err(e) = job.run().await {
                                    error!(job = job.name(), error = %e, "Job run failed");
                                }
                            }
                            _ = shutdown.changed() => {
                                if *shutdown.borrow() {
                                    info!(job = job.name(), "Job schedule stopped");
                                    break;
                                }
                            }
                        }
                    }
                })
            })
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
