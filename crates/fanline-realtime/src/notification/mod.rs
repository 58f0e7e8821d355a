//! Notification fan-out and message rendering.

mod fanout;
pub mod render;

pub use fanout::{NotificationFanout, NotificationPage};
