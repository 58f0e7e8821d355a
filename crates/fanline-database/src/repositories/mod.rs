//! Repository implementations.

pub mod notification;
pub mod user;
