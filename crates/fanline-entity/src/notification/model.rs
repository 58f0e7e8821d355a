//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A persisted notification record.
///
/// Lifecycle: created unread, marked read (setting `read_at`), then
/// eligible for deletion by the retention sweep once read for long enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// The user whose action triggered the notification.
    pub sender_id: Uuid,
    /// Event kind.
    pub kind: NotificationKind,
    /// Whether the recipient has read this notification.
    pub read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// References to the content the event concerns.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reference: NotificationReference,
    /// Kind-specific structured data.
    pub metadata: serde_json::Value,
    /// Optional override for the rendered display message.
    pub custom_message: Option<String>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Links a notification to the content it concerns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationReference {
    /// Referenced post, for like/comment events.
    pub post_id: Option<Uuid>,
    /// Referenced comment, for comment events.
    pub comment_id: Option<Uuid>,
    /// Referenced conversation, for message events.
    pub message_id: Option<Uuid>,
    /// Referenced call, for call events.
    pub call_id: Option<Uuid>,
}

impl NotificationReference {
    /// A reference to a post.
    pub fn post(post_id: Uuid) -> Self {
        Self {
            post_id: Some(post_id),
            ..Default::default()
        }
    }

    /// A reference to a call.
    pub fn call(call_id: Uuid) -> Self {
        Self {
            call_id: Some(call_id),
            ..Default::default()
        }
    }
}
