//! Persistence trait seams.
//!
//! The realtime core treats the user directory and the notification store
//! as external collaborators behind these traits; `fanline-database`
//! provides the Postgres implementations and tests use in-memory fakes.

pub mod directory;
pub mod store;

pub use directory::UserDirectory;
pub use store::{NewNotification, NotificationStore};
