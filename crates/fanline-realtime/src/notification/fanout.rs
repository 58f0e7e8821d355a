use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use fanline_core::error::AppError;
use fanline_core::result::AppResult;
use fanline_core::traits::{NewNotification, NotificationStore, UserDirectory};
use fanline_core::types::pagination::PageRequest;
use fanline_entity::{Notification, SenderSummary};

use crate::event::{DeliveredNotification, PageMeta, ServerEvent};
use crate::gateway::Emitter;
use crate::notification::render;

/// A rendered page of a user's notifications.
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub notifications: Vec<DeliveredNotification>,
    pub pagination: PageMeta,
    pub unread_count: u64,
}

/// Creates, renders and pushes notifications, and owns the read
/// lifecycle.
#[derive(Debug)]
pub struct NotificationFanout {
    store: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
    emitter: Emitter,
}

impl NotificationFanout {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        users: Arc<dyn UserDirectory>,
        emitter: Emitter,
    ) -> Self {
        Self { store, users, emitter }
    }

    /// Create a notification and push it to the recipient's live
    /// connections. Returns `None` when the notification was suppressed
    /// without being stored: self-notifications, unknown recipients and
    /// recipients whose preferences (or do-not-disturb window) gate out
    /// this kind.
    pub async fn create(&self, input: NewNotification) -> AppResult<Option<Notification>> {
        if input.recipient_id == input.sender_id {
            debug!(user_id = %input.recipient_id, "Suppressing self-notification");
            return Ok(None);
        }

        let Some(prefs) = self.users.preferences(input.recipient_id).await? else {
            debug!(recipient_id = %input.recipient_id, "Recipient not found, dropping notification");
            return Ok(None);
        };
        if !prefs.allows(input.kind, Utc::now().time()) {
            debug!(
                recipient_id = %input.recipient_id,
                kind = %input.kind,
                "Notification gated by preferences"
            );
            return Ok(None);
        }

        let record = self.store.create(input).await?;
        let sender = self.users.sender_summary(record.sender_id).await?;
        let delivered = self.render(record.clone(), sender);
        let unread_count = self.store.count_unread(record.recipient_id).await?;

        self.emitter.broadcast_to_user(
            record.recipient_id,
            &ServerEvent::NewNotification {
                notification: delivered,
                unread_count,
            },
        );
        Ok(Some(record))
    }

    /// A rendered, paged listing with the current unread count.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<NotificationPage> {
        let listed = self.store.list_for_user(user_id, page, unread_only).await?;
        let unread_count = self.store.count_unread(user_id).await?;

        let mut senders: HashMap<Uuid, Option<SenderSummary>> = HashMap::new();
        let mut notifications = Vec::with_capacity(listed.items.len());
        for record in listed.items {
            let sender = match senders.get(&record.sender_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.users.sender_summary(record.sender_id).await?;
                    senders.insert(record.sender_id, fetched.clone());
                    fetched
                }
            };
            notifications.push(self.render(record, sender));
        }

        Ok(NotificationPage {
            notifications,
            pagination: PageMeta {
                total: listed.total,
                page: listed.page,
                limit: listed.limit,
                pages: listed.pages,
            },
            unread_count,
        })
    }

    /// Mark one notification read. Fails with NotFound when the id does
    /// not exist or belongs to someone else. Returns the unread count
    /// after the update.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let updated = self.store.mark_read(id, user_id, Utc::now()).await?;
        if updated == 0 {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        self.store.count_unread(user_id).await
    }

    /// Mark a batch read. Ids not owned by the user are skipped, not
    /// errors. Returns the unread count after the update.
    pub async fn mark_many_read(&self, ids: &[Uuid], user_id: Uuid) -> AppResult<u64> {
        if !ids.is_empty() {
            self.store.mark_many_read(ids, user_id, Utc::now()).await?;
        }
        self.store.count_unread(user_id).await
    }

    /// Mark everything read. Returns how many records flipped.
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.store.mark_all_read(user_id, Utc::now()).await
    }

    /// Delete one notification. NotFound when nothing matched.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let deleted = self.store.delete(id, user_id).await?;
        if deleted == 0 {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        Ok(())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        self.store.count_unread(user_id).await
    }

    fn render(&self, record: Notification, sender: Option<SenderSummary>) -> DeliveredNotification {
        let sender_name = sender
            .as_ref()
            .map_or("Someone", SenderSummary::display_name);
        let message = render::display_message(
            record.kind,
            sender_name,
            &record.metadata,
            record.custom_message.as_deref(),
        );
        DeliveredNotification {
            notification: record,
            sender,
            message,
        }
    }
}
