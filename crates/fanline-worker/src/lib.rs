//! Background jobs: stale-presence sweeping and notification retention.

pub mod jobs;
pub mod scheduler;

pub use scheduler::Scheduler;
