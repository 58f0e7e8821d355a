//! Engine: owns the subsystems and drives the connection lifecycle and
//! inbound event dispatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use fanline_core::config::RealtimeConfig;
use fanline_core::error::ErrorKind;
use fanline_core::traits::{NotificationStore, UserDirectory};
use fanline_core::types::pagination::PageRequest;

use crate::call::{CallCoordinator, HandshakeKind, SignalKind};
use crate::connection::{spawn_heartbeat, ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::event::{ClientEvent, ServerEvent};
use crate::gateway::Emitter;
use crate::notification::NotificationFanout;
use crate::presence::{ActivityTracker, PresenceSynchronizer};
use crate::room::{user_room, RoomRegistry, PRESENCE_ROOM};

/// The realtime core. One per process; the transport layer calls
/// [`connect`](Self::connect), [`handle_text`](Self::handle_text) and
/// [`disconnect`](Self::disconnect), everything else is internal.
#[derive(Debug)]
pub struct RealtimeEngine {
    config: RealtimeConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub rooms: Arc<RoomRegistry>,
    pub activity: Arc<ActivityTracker>,
    pub presence: Arc<PresenceSynchronizer>,
    pub notifications: Arc<NotificationFanout>,
    pub calls: Arc<CallCoordinator>,
}

impl RealtimeEngine {
    pub fn new(
        config: RealtimeConfig,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn NotificationStore>,
    ) -> Arc<Self> {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let activity = Arc::new(ActivityTracker::new());
        let emitter = Emitter::new(Arc::clone(&registry), Arc::clone(&rooms));

        let presence = Arc::new(PresenceSynchronizer::new(
            Arc::clone(&users),
            Arc::clone(&registry),
            Arc::clone(&activity),
            emitter.clone(),
            &config,
        ));
        let notifications = Arc::new(NotificationFanout::new(
            store,
            Arc::clone(&users),
            emitter.clone(),
        ));
        let calls = Arc::new(CallCoordinator::new(
            Arc::clone(&registry),
            Arc::clone(&rooms),
            users,
            emitter,
        ));

        Arc::new(Self {
            config,
            registry,
            rooms,
            activity,
            presence,
            notifications,
            calls,
        })
    }

    /// Delivery primitives over this engine's registries, for the
    /// emission gateway.
    pub fn emitter(&self) -> Emitter {
        Emitter::new(Arc::clone(&self.registry), Arc::clone(&self.rooms))
    }

    /// Attach a new authenticated connection. Returns the handle and
    /// the outbound event stream the transport should pump to the
    /// client. Joins the reserved rooms, starts the heartbeat, runs the
    /// presence transition if this is the user's first connection and
    /// seeds the connection with presence snapshots.
    pub async fn connect(
        &self,
        user_id: Uuid,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        let first = self.registry.register(Arc::clone(&handle));
        self.rooms.join(&user_room(user_id), handle.id);
        self.rooms.join(PRESENCE_ROOM, handle.id);
        self.activity.touch(user_id);
        spawn_heartbeat(
            Arc::clone(&handle),
            Duration::from_secs(self.config.heartbeat_interval_seconds),
        );
        info!(connection_id = %handle.id, user_id = %user_id, first, "Connection attached");

        if first {
            self.presence.on_connect(user_id).await;
        }
        self.send_presence_snapshots(&handle).await;

        (handle, rx)
    }

    /// Detach a connection: call rooms are vacated with departure
    /// announcements, and the grace-windowed offline transition is
    /// scheduled if this was the user's last connection.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        self.calls.cleanup_on_disconnect(connection_id);
        if let Some((handle, now_empty)) = self.registry.deregister(connection_id) {
            handle.mark_closed();
            info!(connection_id = %connection_id, user_id = %handle.user_id, now_empty, "Connection detached");
            if now_empty {
                self.presence.schedule_offline(handle.user_id);
            }
        }
    }

    /// Demote users whose activity has gone quiet past the stale
    /// threshold. Their half-open connections are torn down through the
    /// same room-and-registry path a normal disconnect takes, so call
    /// rooms see the departure and no ghost memberships remain. Returns
    /// how many users were swept.
    pub async fn sweep_stale(&self) -> usize {
        let stale = self.presence.stale_users();
        let count = stale.len();
        for user_id in stale {
            warn!(user_id = %user_id, "Sweeping stale presence entry");
            for conn in self.registry.user_connections(user_id) {
                conn.mark_closed();
                self.calls.cleanup_on_disconnect(conn.id);
                self.registry.deregister(conn.id);
            }
            self.presence.go_offline(user_id).await;
        }
        count
    }

    /// Parse and dispatch a raw inbound frame. Malformed frames earn an
    /// error event on the sending connection, never a disconnect.
    pub async fn handle_text(&self, connection_id: ConnectionId, raw: &str) {
        match serde_json::from_str::<ClientEvent>(raw) {
            Ok(event) => self.handle_event(connection_id, event).await,
            Err(e) => {
                debug!(connection_id = %connection_id, error = %e, "Unparseable client frame");
                self.registry.send_to_connection(
                    connection_id,
                    ServerEvent::error("protocol", "Unrecognized event"),
                );
            }
        }
    }

    /// Dispatch one inbound event. Any inbound traffic counts as
    /// activity for the presence tracker.
    pub async fn handle_event(&self, connection_id: ConnectionId, event: ClientEvent) {
        let Some(handle) = self.registry.get(connection_id) else {
            debug!(connection_id = %connection_id, "Event from unknown connection");
            return;
        };
        let user_id = handle.user_id;
        self.activity.touch(user_id);

        match event {
            ClientEvent::Pong => {}
            ClientEvent::GetOnlineUsers => {
                handle.send(ServerEvent::OnlineUsers {
                    users: self.registry.active_user_ids(),
                });
            }
            ClientEvent::GetOnlineCreators => match self.presence.online_creators().await {
                Ok(creators) => {
                    handle.send(ServerEvent::OnlineCreators { creators });
                }
                Err(e) => {
                    warn!(error = %e, "Creator roster fetch failed");
                    handle.send(ServerEvent::error("presence", "Failed to load online creators"));
                }
            },
            ClientEvent::GetNotifications { page, limit, unread_only } => {
                let page = PageRequest::new(page.unwrap_or(1), limit.unwrap_or(PageRequest::DEFAULT_LIMIT));
                match self.notifications.list_for_user(user_id, &page, unread_only).await {
                    Ok(listed) => {
                        handle.send(ServerEvent::Notifications {
                            notifications: listed.notifications,
                            pagination: listed.pagination,
                            unread_count: listed.unread_count,
                        });
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "Notification listing failed");
                        handle.send(ServerEvent::error("notification", "Failed to load notifications"));
                    }
                }
            }
            ClientEvent::MarkNotificationRead { notification_id } => {
                match self.notifications.mark_read(notification_id, user_id).await {
                    Ok(unread_count) => {
                        handle.send(ServerEvent::NotificationMarkedRead {
                            notification_id,
                            unread_count,
                        });
                    }
                    Err(e) if e.kind == ErrorKind::NotFound => {
                        debug!(user_id = %user_id, notification_id = %notification_id, "Mark read missed");
                        handle.send(ServerEvent::error("notification", "Notification not found"));
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, notification_id = %notification_id, error = %e, "Mark read failed");
                        handle.send(ServerEvent::error("notification", "Failed to update notification"));
                    }
                }
            }
            ClientEvent::MarkAllNotificationsRead => {
                match self.notifications.mark_all_read(user_id).await {
                    Ok(_) => {
                        // Every unread record was just flipped.
                        handle.send(ServerEvent::AllNotificationsMarkedRead { unread_count: 0 });
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "Mark all read failed");
                        handle.send(ServerEvent::error("notification", "Failed to mark all read"));
                    }
                }
            }
            ClientEvent::JoinCall { room } => self.calls.join(connection_id, &room),
            ClientEvent::LeaveCall { room } => self.calls.leave(connection_id, &room),
            ClientEvent::Offer { room, offer, to } => {
                self.calls.relay(connection_id, SignalKind::Offer, &room, offer, to);
            }
            ClientEvent::Answer { room, answer, to } => {
                self.calls.relay(connection_id, SignalKind::Answer, &room, answer, to);
            }
            ClientEvent::IceCandidate { room, candidate, to } => {
                self.calls.relay(connection_id, SignalKind::IceCandidate, &room, candidate, to);
            }
            ClientEvent::CallInvitation { to, room } => {
                self.calls.invite(user_id, to, room).await;
            }
            ClientEvent::CallAccepted { to, room } => {
                self.calls.respond(HandshakeKind::Accepted, user_id, to, room);
            }
            ClientEvent::CallDeclined { to, room } => {
                self.calls.respond(HandshakeKind::Declined, user_id, to, room);
            }
            ClientEvent::CallCanceled { to, room } => {
                self.calls.respond(HandshakeKind::Canceled, user_id, to, room);
            }
            ClientEvent::ToggleMute { room, muted } => {
                self.calls.toggle_mute(connection_id, &room, muted);
            }
            ClientEvent::ToggleVideo { room, video_enabled } => {
                self.calls.toggle_video(connection_id, &room, video_enabled);
            }
            ClientEvent::CallTimeWarning { room, data } => {
                self.calls.broadcast_time_warning(connection_id, &room, data);
            }
            ClientEvent::CallTimeExceeded { room, data } => {
                self.calls.broadcast_time_exceeded(connection_id, &room, data);
            }
            ClientEvent::CallCooldownSet { room, data } => {
                self.calls.broadcast_cooldown_set(connection_id, &room, data);
            }
        }
    }

    async fn send_presence_snapshots(&self, handle: &ConnectionHandle) {
        handle.send(ServerEvent::OnlineUsers {
            users: self.registry.active_user_ids(),
        });
        match self.presence.online_creators().await {
            Ok(creators) => {
                handle.send(ServerEvent::OnlineCreators { creators });
            }
            Err(e) => warn!(error = %e, "Skipping creator snapshot for new connection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use fanline_core::result::AppResult;
    use fanline_core::traits::NewNotification;
    use fanline_core::types::pagination::{PageRequest, PageResponse};
    use fanline_entity::{
        CreatorSummary, Notification, NotificationPreferences, SenderSummary,
    };

    #[derive(Debug, Default)]
    struct FlagDirectory {
        online: Mutex<HashMap<Uuid, bool>>,
    }

    #[async_trait]
    impl UserDirectory for FlagDirectory {
        async fn sender_summary(&self, _user_id: Uuid) -> AppResult<Option<SenderSummary>> {
            Ok(None)
        }

        async fn preferences(&self, _user_id: Uuid) -> AppResult<Option<NotificationPreferences>> {
            Ok(None)
        }

        async fn set_online(&self, user_id: Uuid, online: bool) -> AppResult<bool> {
            let mut flags = self.online.lock().unwrap();
            let current = flags.entry(user_id).or_insert(false);
            if *current == online {
                return Ok(false);
            }
            *current = online;
            Ok(true)
        }

        async fn online_creators(&self) -> AppResult<Vec<CreatorSummary>> {
            Ok(Vec::new())
        }
    }

    /// The sweep path never touches the store.
    #[derive(Debug)]
    struct NullStore;

    #[async_trait]
    impl NotificationStore for NullStore {
        async fn create(&self, _input: NewNotification) -> AppResult<Notification> {
            unreachable!()
        }

        async fn list_for_user(
            &self,
            _user_id: Uuid,
            _page: &PageRequest,
            _unread_only: bool,
        ) -> AppResult<PageResponse<Notification>> {
            unreachable!()
        }

        async fn count_unread(&self, _user_id: Uuid) -> AppResult<u64> {
            unreachable!()
        }

        async fn mark_read(&self, _id: Uuid, _user_id: Uuid, _at: DateTime<Utc>) -> AppResult<u64> {
            unreachable!()
        }

        async fn mark_many_read(
            &self,
            _ids: &[Uuid],
            _user_id: Uuid,
            _at: DateTime<Utc>,
        ) -> AppResult<u64> {
            unreachable!()
        }

        async fn mark_all_read(&self, _user_id: Uuid, _at: DateTime<Utc>) -> AppResult<u64> {
            unreachable!()
        }

        async fn delete(&self, _id: Uuid, _user_id: Uuid) -> AppResult<u64> {
            unreachable!()
        }

        async fn delete_read_before(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn sweep_vacates_call_rooms_and_announces_departure() {
        let users = Arc::new(FlagDirectory::default());
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            Arc::clone(&users) as Arc<dyn UserDirectory>,
            Arc::new(NullStore),
        );
        let (bob, mira) = (Uuid::new_v4(), Uuid::new_v4());

        let (b, _b_rx) = engine.connect(bob).await;
        let (m, mut m_rx) = engine.connect(mira).await;
        engine.calls.join(b.id, "call-1");
        engine.calls.join(m.id, "call-1");

        engine.activity.backdate(bob, chrono::Duration::seconds(600));
        assert_eq!(engine.sweep_stale().await, 1);

        assert!(!engine.registry.is_user_connected(bob));
        assert!(!engine.rooms.is_member("call-1", b.id));
        assert_eq!(engine.rooms.member_count("call-1"), 1);
        assert_eq!(users.online.lock().unwrap().get(&bob), Some(&false));

        // The remaining member hears about the abrupt departure.
        let left = loop {
            let event = tokio::time::timeout(Duration::from_millis(500), m_rx.recv())
                .await
                .expect("timed out waiting for departure")
                .expect("event stream closed");
            if let ServerEvent::UserLeft { id, total_participants } = event {
                break (id, total_participants);
            }
        };
        assert_eq!(left, (b.id, 1));
    }

    #[tokio::test]
    async fn sweep_with_no_stale_entries_is_a_noop() {
        let users = Arc::new(FlagDirectory::default());
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            Arc::clone(&users) as Arc<dyn UserDirectory>,
            Arc::new(NullStore),
        );
        let bob = Uuid::new_v4();
        let (_b, _b_rx) = engine.connect(bob).await;

        assert_eq!(engine.sweep_stale().await, 0);
        assert!(engine.registry.is_user_connected(bob));
        assert_eq!(users.online.lock().unwrap().get(&bob), Some(&true));
    }
}
