//! Wire-level event vocabulary.
//!
//! Both directions use internally tagged JSON (`{"type": "...", ...}`)
//! with camelCase names, matching what the web and mobile clients send.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use fanline_entity::{CreatorSummary, Notification, SenderSummary};

use crate::connection::ConnectionId;

/// A stored notification decorated for delivery: the sender's display
/// data plus the rendered human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredNotification {
    #[serde(flatten)]
    pub notification: Notification,
    pub sender: Option<SenderSummary>,
    pub message: String,
}

/// Pagination block attached to notification list replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// Events originating from a client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Heartbeat reply.
    Pong,
    GetOnlineUsers,
    GetOnlineCreators,
    GetNotifications {
        #[serde(default)]
        page: Option<u64>,
        #[serde(default)]
        limit: Option<u64>,
        #[serde(default)]
        unread_only: bool,
    },
    MarkNotificationRead {
        notification_id: Uuid,
    },
    MarkAllNotificationsRead,
    JoinCall {
        room: String,
    },
    LeaveCall {
        room: String,
    },
    Offer {
        room: String,
        offer: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    Answer {
        room: String,
        answer: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    IceCandidate {
        room: String,
        candidate: Value,
        #[serde(default)]
        to: Option<ConnectionId>,
    },
    CallInvitation {
        to: Uuid,
        room: String,
    },
    CallAccepted {
        to: Uuid,
        room: String,
    },
    CallDeclined {
        to: Uuid,
        room: String,
    },
    CallCanceled {
        to: Uuid,
        room: String,
    },
    ToggleMute {
        room: String,
        muted: bool,
    },
    ToggleVideo {
        room: String,
        video_enabled: bool,
    },
    CallTimeWarning {
        room: String,
        data: Value,
    },
    CallTimeExceeded {
        room: String,
        data: Value,
    },
    CallCooldownSet {
        room: String,
        data: Value,
    },
}

/// Events pushed to client connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Heartbeat probe.
    Ping,
    UserOnline {
        user_id: Uuid,
    },
    UserOffline {
        user_id: Uuid,
    },
    OnlineUsers {
        users: Vec<Uuid>,
    },
    OnlineCreators {
        creators: Vec<CreatorSummary>,
    },
    NewNotification {
        notification: DeliveredNotification,
        unread_count: u64,
    },
    Notifications {
        notifications: Vec<DeliveredNotification>,
        pagination: PageMeta,
        unread_count: u64,
    },
    NotificationMarkedRead {
        notification_id: Uuid,
        unread_count: u64,
    },
    AllNotificationsMarkedRead {
        unread_count: u64,
    },
    RoomJoined {
        room: String,
        participants: Vec<ConnectionId>,
        total_participants: usize,
    },
    UserJoined {
        id: ConnectionId,
        total_participants: usize,
    },
    UserLeft {
        id: ConnectionId,
        total_participants: usize,
    },
    Offer {
        offer: Value,
        from: ConnectionId,
    },
    Answer {
        answer: Value,
        from: ConnectionId,
    },
    IceCandidate {
        candidate: Value,
        from: ConnectionId,
    },
    CallInvitation {
        from: Uuid,
        caller: Option<SenderSummary>,
        room: String,
    },
    CallAccepted {
        from: Uuid,
        room: String,
    },
    CallDeclined {
        from: Uuid,
        room: String,
    },
    CallCanceled {
        from: Uuid,
        room: String,
    },
    ParticipantMuted {
        id: ConnectionId,
        muted: bool,
    },
    ParticipantVideoChanged {
        id: ConnectionId,
        video_enabled: bool,
    },
    CallTimeWarning {
        data: Value,
    },
    CallTimeExceeded {
        data: Value,
    },
    CallCooldownSet {
        data: Value,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl ServerEvent {
    /// Build an error event scoped to a subsystem (`"notification"`,
    /// `"call"`, ...).
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
