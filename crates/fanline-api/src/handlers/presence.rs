//! Presence REST endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use fanline_entity::CreatorSummary;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineCreatorsResponse {
    pub creators: Vec<CreatorSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersResponse {
    pub users: Vec<Uuid>,
}

/// GET /api/presence/creators
pub async fn online_creators(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<OnlineCreatorsResponse>> {
    let creators = state.engine.presence.online_creators().await?;
    Ok(Json(OnlineCreatorsResponse { creators }))
}

/// GET /api/presence/online
pub async fn online_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<OnlineUsersResponse>> {
    Ok(Json(OnlineUsersResponse {
        users: state.engine.registry.active_user_ids(),
    }))
}
