//! The persisted notification store seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fanline_entity::notification::model::{Notification, NotificationReference};
use fanline_entity::NotificationKind;

use crate::result::AppResult;
use crate::types::pagination::{PageRequest, PageResponse};

/// Parameters for creating a notification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Recipient user.
    pub recipient_id: Uuid,
    /// User whose action triggered the event.
    pub sender_id: Uuid,
    /// Event kind.
    pub kind: NotificationKind,
    /// Content references.
    pub reference: NotificationReference,
    /// Kind-specific data.
    pub metadata: serde_json::Value,
    /// Optional display-message override.
    pub custom_message: Option<String>,
}

/// CRUD and read-state access to the persisted notification store.
///
/// All mutations are scoped to the owning recipient; a mark/delete call
/// for a record the user does not own affects zero rows.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug {
    /// Persist a new unread notification.
    async fn create(&self, input: NewNotification) -> AppResult<Notification>;

    /// Page through a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count a user's unread notifications.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64>;

    /// Mark one notification read. Returns the number of rows affected.
    async fn mark_read(&self, id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;

    /// Mark a set of notifications read. Idempotent.
    async fn mark_many_read(
        &self,
        ids: &[Uuid],
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Mark all of a user's unread notifications read. Idempotent.
    async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;

    /// Delete one notification owned by the user.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<u64>;

    /// Delete read notifications whose `read_at` is older than the cutoff.
    /// Unread notifications are never touched, regardless of age.
    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
