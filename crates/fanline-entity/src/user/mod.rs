//! User domain models.

pub mod model;
pub mod preference;
pub mod role;
