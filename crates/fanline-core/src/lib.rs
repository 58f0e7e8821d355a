//! # fanline-core
//!
//! Shared foundations for the Fanline backend:
//!
//! - Unified error type ([`error::AppError`]) and result alias
//! - Configuration schemas loaded from TOML + environment
//! - Pagination types for list endpoints
//! - Persistence trait seams ([`traits::UserDirectory`],
//!   [`traits::NotificationStore`]) that the realtime core calls into

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
