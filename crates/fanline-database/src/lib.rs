//! # fanline-database
//!
//! Postgres persistence for Fanline: connection pool construction,
//! embedded migrations, and the repositories implementing the
//! `fanline-core` trait seams.

pub mod connection;
pub mod repositories;

pub use repositories::notification::NotificationRepository;
pub use repositories::user::UserRepository;
