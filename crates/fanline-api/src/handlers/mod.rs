//! HTTP handlers.

pub mod notification;
pub mod presence;
pub mod ws;
