//! Notification domain models.

pub mod kind;
pub mod model;
