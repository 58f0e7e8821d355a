//! HTTP surface: REST endpoints for notifications and presence plus
//! the WebSocket upgrade.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
