//! Presence: activity tracking and online-state synchronization.

mod activity;
mod synchronizer;

pub use activity::ActivityTracker;
pub use synchronizer::PresenceSynchronizer;
