//! Notification REST endpoints. Mutations here reach connected clients
//! through the same fan-out the WebSocket path uses.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fanline_core::types::pagination::PageRequest;
use fanline_realtime::event::{DeliveredNotification, PageMeta};

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub notifications: Vec<DeliveredNotification>,
    pub pagination: PageMeta,
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadManyRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllResponse {
    pub marked: u64,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
    );
    let listed = state
        .engine
        .notifications
        .list_for_user(auth.user_id, &page, query.unread_only)
        .await?;
    Ok(Json(ListResponse {
        notifications: listed.notifications,
        pagination: listed.pagination,
        unread_count: listed.unread_count,
    }))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state.engine.notifications.unread_count(auth.user_id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state
        .engine
        .notifications
        .mark_read(id, auth.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// PATCH /api/notifications/read-many
pub async fn mark_many_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ReadManyRequest>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state
        .engine
        .notifications
        .mark_many_read(&body.ids, auth.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ReadAllResponse>> {
    let marked = state.engine.notifications.mark_all_read(auth.user_id).await?;
    Ok(Json(ReadAllResponse { marked }))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.engine.notifications.delete(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
