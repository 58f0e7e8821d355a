//! # fanline-entity
//!
//! Domain models shared across the Fanline backend. Pure data types with
//! serde and sqlx derives; no I/O.

pub mod notification;
pub mod user;

pub use notification::kind::NotificationKind;
pub use notification::model::{Notification, NotificationReference};
pub use user::model::{CreatorSummary, SenderSummary, User};
pub use user::preference::NotificationPreferences;
pub use user::role::UserRole;
