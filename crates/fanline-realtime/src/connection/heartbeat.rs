use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::connection::ConnectionHandle;
use crate::event::ServerEvent;

/// Spawn the per-connection probe loop. Probes keep NATs and proxies
/// from reaping idle transports; the client answers with `pong`, which
/// the engine records as activity. The loop ends when the connection
/// closes or stops accepting events.
pub fn spawn_heartbeat(handle: Arc<ConnectionHandle>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it so probes start one
        // interval after connect.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if handle.is_closed() || !handle.send(ServerEvent::Ping) {
                debug!(connection_id = %handle.id, "Heartbeat loop ending");
                break;
            }
        }
    })
}
