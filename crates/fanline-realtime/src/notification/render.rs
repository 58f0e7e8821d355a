//! Human-readable notification messages.

use serde_json::Value;

use fanline_entity::NotificationKind;

const FALLBACK: &str = "You have a new notification";

/// Render the display message for a notification. A custom message
/// always wins over the per-kind template.
pub fn display_message(
    kind: NotificationKind,
    sender_name: &str,
    metadata: &Value,
    custom_message: Option<&str>,
) -> String {
    if let Some(custom) = custom_message {
        if !custom.is_empty() {
            return custom.to_string();
        }
    }
    match kind {
        NotificationKind::Like => format!("{sender_name} liked your post"),
        NotificationKind::Comment => format!("{sender_name} commented on your post"),
        NotificationKind::Follow => format!("{sender_name} started following you"),
        NotificationKind::Message => format!("{sender_name} sent you a message"),
        NotificationKind::CallIncoming => format!("{sender_name} is calling you"),
        NotificationKind::CallMissed => format!("You missed a call from {sender_name}"),
        NotificationKind::CallEnded => format!("Your call with {sender_name} has ended"),
        NotificationKind::System => metadata
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK)
            .to_string(),
    }
}
