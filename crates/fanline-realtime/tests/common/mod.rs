//! In-memory directory and store fakes plus event-stream helpers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use fanline_core::config::RealtimeConfig;
use fanline_core::error::AppError;
use fanline_core::result::AppResult;
use fanline_core::traits::{NewNotification, NotificationStore, UserDirectory};
use fanline_core::types::pagination::{PageRequest, PageResponse};
use fanline_entity::{
    CreatorSummary, Notification, NotificationPreferences, SenderSummary,
};
use fanline_realtime::event::ServerEvent;
use fanline_realtime::RealtimeEngine;

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub nickname: String,
    pub creator: bool,
    pub online: bool,
    pub prefs: NotificationPreferences,
}

impl FakeUser {
    pub fn fan(nickname: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            creator: false,
            online: false,
            prefs: NotificationPreferences::default(),
        }
    }

    pub fn creator(nickname: &str) -> Self {
        Self {
            creator: true,
            ..Self::fan(nickname)
        }
    }
}

/// UserDirectory over a plain map, with an optional fault injector for
/// the creator roster query.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: Mutex<HashMap<Uuid, FakeUser>>,
    creator_failures: AtomicU32,
}

impl InMemoryDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, user: FakeUser) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(id, user);
        id
    }

    pub fn is_online(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().get(&id).is_some_and(|u| u.online)
    }

    pub fn set_prefs(&self, id: Uuid, prefs: NotificationPreferences) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.prefs = prefs;
        }
    }

    /// Make the next `n` creator roster fetches fail transiently.
    pub fn fail_creator_fetches(&self, n: u32) {
        self.creator_failures.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn sender_summary(&self, user_id: Uuid) -> AppResult<Option<SenderSummary>> {
        Ok(self.users.lock().unwrap().get(&user_id).map(|u| SenderSummary {
            id: user_id,
            first_name: u.nickname.clone(),
            last_name: None,
            nickname: u.nickname.clone(),
            avatar: None,
        }))
    }

    async fn preferences(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>> {
        Ok(self.users.lock().unwrap().get(&user_id).map(|u| u.prefs.clone()))
    }

    async fn set_online(&self, user_id: Uuid, online: bool) -> AppResult<bool> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.online == online {
            return Ok(false);
        }
        user.online = online;
        Ok(true)
    }

    async fn online_creators(&self) -> AppResult<Vec<CreatorSummary>> {
        if self
            .creator_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AppError::database("Injected roster failure"));
        }
        let users = self.users.lock().unwrap();
        let mut creators: Vec<CreatorSummary> = users
            .iter()
            .filter(|(_, u)| u.creator && u.online)
            .map(|(id, u)| CreatorSummary {
                id: *id,
                first_name: u.nickname.clone(),
                last_name: None,
                nickname: u.nickname.clone(),
                avatar: None,
                bio: None,
            })
            .collect();
        creators.sort_by(|a, b| a.nickname.cmp(&b.nickname));
        Ok(creators)
    }
}

/// NotificationStore over a Vec, with an optional fault injector for
/// mark-read updates.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Notification>>,
    mark_failures: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Make the next `n` mark-read updates fail transiently.
    pub fn fail_mark_reads(&self, n: u32) {
        self.mark_failures.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn create(&self, input: NewNotification) -> AppResult<Notification> {
        let record = Notification {
            id: Uuid::new_v4(),
            recipient_id: input.recipient_id,
            sender_id: input.sender_id,
            kind: input.kind,
            read: false,
            read_at: None,
            reference: input.reference,
            metadata: input.metadata,
            custom_message: input.custom_message,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<Notification> = records
            .iter()
            .filter(|n| n.recipient_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|n| n.recipient_id == user_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        if self
            .mark_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AppError::database("Injected store failure"));
        }
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == user_id)
        {
            Some(n) => {
                n.read = true;
                n.read_at = Some(at);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn mark_many_read(
        &self,
        ids: &[Uuid],
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut records = self.records.lock().unwrap();
        let mut updated = 0;
        for n in records
            .iter_mut()
            .filter(|n| ids.contains(&n.id) && n.recipient_id == user_id && !n.read)
        {
            n.read = true;
            n.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let mut records = self.records.lock().unwrap();
        let mut updated = 0;
        for n in records
            .iter_mut()
            .filter(|n| n.recipient_id == user_id && !n.read)
        {
            n.read = true;
            n.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|n| !(n.id == id && n.recipient_id == user_id));
        Ok((before - records.len()) as u64)
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|n| !(n.read && n.read_at.is_some_and(|at| at < cutoff)));
        Ok((before - records.len()) as u64)
    }
}

/// Grace window used by the engine under test, in milliseconds.
pub const TEST_GRACE_MS: u64 = 40;

pub fn test_config() -> RealtimeConfig {
    RealtimeConfig {
        heartbeat_interval_seconds: 60,
        stale_threshold_seconds: 300,
        disconnect_grace_ms: TEST_GRACE_MS,
        channel_buffer_size: 64,
        presence_retry_attempts: 3,
        presence_retry_delay_ms: 10,
    }
}

pub fn build_engine(
    users: Arc<InMemoryDirectory>,
    store: Arc<InMemoryStore>,
) -> Arc<RealtimeEngine> {
    RealtimeEngine::new(test_config(), users, store)
}

/// Wait for the first event matching the predicate, skipping anything
/// else in the stream.
pub async fn expect_event<F>(rx: &mut mpsc::Receiver<ServerEvent>, pred: F) -> ServerEvent
where
    F: Fn(&ServerEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event stream closed");
        if pred(&event) {
            return event;
        }
    }
}

/// Drain the stream for a fixed window and return everything received.
pub async fn collect_for(
    rx: &mut mpsc::Receiver<ServerEvent>,
    window: Duration,
) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) | Err(_) => return events,
        }
    }
}

pub async fn pause(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
