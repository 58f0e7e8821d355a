//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The domain event a notification was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone liked your post.
    Like,
    /// Someone commented on your post.
    Comment,
    /// Someone started following you.
    Follow,
    /// Someone sent you a direct message.
    Message,
    /// Someone is calling you.
    CallIncoming,
    /// You missed a call.
    CallMissed,
    /// A call ended.
    CallEnded,
    /// Platform announcement.
    System,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follow => "follow",
            Self::Message => "message",
            Self::CallIncoming => "call_incoming",
            Self::CallMissed => "call_missed",
            Self::CallEnded => "call_ended",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
