//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::preference::NotificationPreferences;
use super::role::UserRole;

/// A platform user account.
///
/// Owned by the user directory; the realtime core only mutates
/// `is_online` (through the presence synchronizer) and reads the rest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: Option<String>,
    /// Public handle.
    pub nickname: String,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Profile bio.
    pub bio: Option<String>,
    /// Account role.
    pub role: UserRole,
    /// Whether the account is banned.
    pub banned: bool,
    /// Whether the user currently has at least one live connection.
    pub is_online: bool,
    /// Notification delivery preferences (JSONB column).
    pub notification_preferences: sqlx::types::Json<NotificationPreferences>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The name shown in rendered notification messages.
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.nickname
        } else {
            &self.first_name
        }
    }
}

/// The denormalized creator view broadcast as `onlineCreators`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CreatorSummary {
    /// User identifier.
    pub id: Uuid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: Option<String>,
    /// Public handle.
    pub nickname: String,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Profile bio.
    pub bio: Option<String>,
}

/// The sender fields attached to a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SenderSummary {
    /// User identifier.
    pub id: Uuid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: Option<String>,
    /// Public handle.
    pub nickname: String,
    /// Avatar URL.
    pub avatar: Option<String>,
}

impl SenderSummary {
    /// The name used when rendering "X liked your post" messages.
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.nickname
        } else {
            &self.first_name
        }
    }
}
