//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use fanline_core::error::{AppError, ErrorKind};
use fanline_core::result::AppResult;
use fanline_core::traits::UserDirectory;
use fanline_entity::user::model::{CreatorSummary, SenderSummary, User};
use fanline_entity::NotificationPreferences;

/// Repository for user directory access.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a full user record.
    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch user", e))
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn sender_summary(&self, user_id: Uuid) -> AppResult<Option<SenderSummary>> {
        sqlx::query_as::<_, SenderSummary>(
            "SELECT id, first_name, last_name, nickname, avatar FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch sender", e))
    }

    async fn preferences(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>> {
        let prefs: Option<sqlx::types::Json<NotificationPreferences>> = sqlx::query_scalar(
            "SELECT notification_preferences FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch preferences", e))?;

        Ok(prefs.map(|p| p.0))
    }

    async fn set_online(&self, user_id: Uuid, online: bool) -> AppResult<bool> {
        // Read-check-write under a row lock so two concurrent transitions
        // for the same user cannot interleave between the check and the
        // update. The broadcast decision hangs off the returned flag.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin tx", e))?;

        let current: Option<bool> =
            sqlx::query_scalar("SELECT is_online FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to read online flag", e)
                })?;

        let Some(current) = current else {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        };

        if current == online {
            tx.commit()
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
            return Ok(false);
        }

        sqlx::query("UPDATE users SET is_online = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(online)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update online flag", e)
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        Ok(true)
    }

    async fn online_creators(&self) -> AppResult<Vec<CreatorSummary>> {
        sqlx::query_as::<_, CreatorSummary>(
            "SELECT id, first_name, last_name, nickname, avatar, bio FROM users \
             WHERE role = 'creator' AND banned = FALSE AND is_online = TRUE \
             ORDER BY nickname",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list online creators", e))
    }
}
