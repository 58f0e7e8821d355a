//! Route table and middleware stack.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::{notification, presence, ws};
use crate::state::AppState;

/// Build the application router with CORS and request tracing.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .route(
            "/api/notifications",
            get(notification::list),
        )
        .route(
            "/api/notifications/unread-count",
            get(notification::unread_count),
        )
        .route(
            "/api/notifications/read-many",
            patch(notification::mark_many_read),
        )
        .route(
            "/api/notifications/read-all",
            patch(notification::mark_all_read),
        )
        .route(
            "/api/notifications/{id}/read",
            patch(notification::mark_read),
        )
        .route("/api/notifications/{id}", delete(notification::delete))
        .route("/api/presence/creators", get(presence::online_creators))
        .route("/api/presence/online", get(presence::online_users))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
