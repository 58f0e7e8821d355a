//! Named rooms: reserved per-user and presence rooms plus client-named
//! call rooms.

mod registry;

pub use registry::RoomRegistry;

use uuid::Uuid;

/// Room every connection joins for presence broadcasts.
pub const PRESENCE_ROOM: &str = "presence";

const USER_ROOM_PREFIX: &str = "user:";

/// Reserved room holding all of one user's connections.
pub fn user_room(user_id: Uuid) -> String {
    format!("{USER_ROOM_PREFIX}{user_id}")
}

/// True for client-named call rooms, false for the reserved rooms the
/// engine manages itself.
pub fn is_call_room(name: &str) -> bool {
    name != PRESENCE_ROOM && !name.starts_with(USER_ROOM_PREFIX)
}

/// Validate a client-supplied call room name. Reserved names can never
/// pass: the allowed alphabet excludes `:` and the presence room name
/// is rejected outright.
pub fn validate_room_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > 64 {
        return Err("Room name must be 1-64 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("Room name contains invalid characters");
    }
    if name == PRESENCE_ROOM {
        return Err("Room name is reserved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_pass() {
        assert!(validate_room_name("call-abc123").is_ok());
        assert!(validate_room_name("a").is_ok());
        assert!(validate_room_name("room.1_x-y").is_ok());
    }

    #[test]
    fn reserved_and_malformed_names_fail() {
        assert!(validate_room_name("").is_err());
        assert!(validate_room_name(&"x".repeat(65)).is_err());
        assert!(validate_room_name("presence").is_err());
        assert!(validate_room_name("user:123").is_err());
        assert!(validate_room_name("has space").is_err());
    }

    #[test]
    fn call_room_classification() {
        let uid = Uuid::new_v4();
        assert!(!is_call_room(PRESENCE_ROOM));
        assert!(!is_call_room(&user_room(uid)));
        assert!(is_call_room("call-abc"));
    }
}
