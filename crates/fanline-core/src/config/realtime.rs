//! Real-time websocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (websocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Interval between heartbeat probes, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Inactivity threshold after which a user with no live connections
    /// is demoted to offline, in seconds.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_seconds: u64,
    /// Grace window between the last disconnect and the offline
    /// transition, in milliseconds. Absorbs rapid reconnects.
    #[serde(default = "default_disconnect_grace")]
    pub disconnect_grace_ms: u64,
    /// Outbound per-connection channel buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Attempts for presence queries against the persisted store.
    #[serde(default = "default_retry_attempts")]
    pub presence_retry_attempts: u32,
    /// Fixed delay between presence query retries, in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub presence_retry_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            stale_threshold_seconds: default_stale_threshold(),
            disconnect_grace_ms: default_disconnect_grace(),
            channel_buffer_size: default_channel_buffer(),
            presence_retry_attempts: default_retry_attempts(),
            presence_retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_stale_threshold() -> u64 {
    300
}

fn default_disconnect_grace() -> u64 {
    2000
}

fn default_channel_buffer() -> usize {
    256
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}
