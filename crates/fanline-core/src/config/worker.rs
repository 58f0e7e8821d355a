//! Background sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic maintenance sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Interval between stale-presence sweeps, in seconds.
    #[serde(default = "default_presence_sweep_interval")]
    pub presence_sweep_interval_seconds: u64,
    /// Interval between notification retention sweeps, in seconds.
    #[serde(default = "default_retention_sweep_interval")]
    pub retention_sweep_interval_seconds: u64,
    /// How long a read notification is kept before deletion, in minutes.
    #[serde(default = "default_read_retention")]
    pub read_retention_minutes: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            presence_sweep_interval_seconds: default_presence_sweep_interval(),
            retention_sweep_interval_seconds: default_retention_sweep_interval(),
            read_retention_minutes: default_read_retention(),
        }
    }
}

fn default_presence_sweep_interval() -> u64 {
    30
}

fn default_retention_sweep_interval() -> u64 {
    300
}

fn default_read_retention() -> u64 {
    60
}
