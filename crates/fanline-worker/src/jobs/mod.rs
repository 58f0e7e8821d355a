//! Job implementations.

mod notification;
mod presence;

pub use notification::RetentionSweepJob;
pub use presence::PresenceSweepJob;
