//! The persisted user directory seam.

use async_trait::async_trait;
use uuid::Uuid;

use fanline_entity::user::model::{CreatorSummary, SenderSummary};
use fanline_entity::NotificationPreferences;

use crate::result::AppResult;

/// Read and presence-flag access to the persisted user directory.
///
/// `set_online` is the only mutation the realtime core performs; it must
/// be atomic against concurrent transitions for the same user (a
/// transactional read-check-write in the Postgres implementation).
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Look up the public sender fields for a user.
    async fn sender_summary(&self, user_id: Uuid) -> AppResult<Option<SenderSummary>>;

    /// Look up a user's notification preferences.
    async fn preferences(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>>;

    /// Atomically set the persisted online flag.
    ///
    /// Returns `true` when the flag actually changed, `false` when it
    /// already held the requested value (so the caller can suppress
    /// duplicate presence broadcasts).
    async fn set_online(&self, user_id: Uuid, online: bool) -> AppResult<bool>;

    /// The online, non-banned creators.
    async fn online_creators(&self) -> AppResult<Vec<CreatorSummary>>;
}
