//! Shared API state.

use std::sync::Arc;

use fanline_core::config::AuthConfig;
use fanline_realtime::RealtimeEngine;

/// State injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<RealtimeEngine>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(engine: Arc<RealtimeEngine>, auth: AuthConfig) -> Self {
        Self {
            engine,
            auth: Arc::new(auth),
        }
    }
}
