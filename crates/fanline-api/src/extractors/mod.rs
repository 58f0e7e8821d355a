//! Request extractors.

mod auth;

pub use auth::{decode_token, AuthUser, Claims};
