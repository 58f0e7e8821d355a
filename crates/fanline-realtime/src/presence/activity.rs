use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Last-seen timestamps for connected users. Heartbeat replies and any
/// inbound event refresh the entry; the stale sweep demotes users whose
/// entry has gone quiet.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    last_active: DashMap<Uuid, DateTime<Utc>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&self, user_id: Uuid) {
        self.last_active.insert(user_id, Utc::now());
    }

    /// Drop tracking for a user that is confirmed offline.
    pub fn remove(&self, user_id: Uuid) {
        self.last_active.remove(&user_id);
    }

    pub fn last_seen(&self, user_id: Uuid) -> Option<DateTime<Utc>> {
        self.last_active.get(&user_id).map(|t| *t)
    }

    /// Users whose last activity is older than the threshold.
    pub fn stale_user_ids(&self, threshold: Duration) -> Vec<Uuid> {
        let cutoff = Utc::now() - threshold;
        self.last_active
            .iter()
            .filter(|e| *e.value() < cutoff)
            .map(|e| *e.key())
            .collect()
    }

    pub fn tracked_count(&self) -> usize {
        self.last_active.len()
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, user_id: Uuid, by: Duration) {
        self.last_active.insert(user_id, Utc::now() - by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_not_stale() {
        let tracker = ActivityTracker::new();
        let user = Uuid::new_v4();
        tracker.touch(user);
        assert!(tracker.stale_user_ids(Duration::seconds(300)).is_empty());
    }

    #[test]
    fn old_entries_are_reported_stale() {
        let tracker = ActivityTracker::new();
        let (fresh, quiet) = (Uuid::new_v4(), Uuid::new_v4());
        tracker.touch(fresh);
        tracker.backdate(quiet, Duration::seconds(600));

        assert_eq!(tracker.stale_user_ids(Duration::seconds(300)), vec![quiet]);
    }

    #[test]
    fn touch_resets_staleness() {
        let tracker = ActivityTracker::new();
        let user = Uuid::new_v4();
        tracker.backdate(user, Duration::seconds(600));
        tracker.touch(user);
        assert!(tracker.stale_user_ids(Duration::seconds(300)).is_empty());
    }

    #[test]
    fn remove_drops_tracking() {
        let tracker = ActivityTracker::new();
        let user = Uuid::new_v4();
        tracker.touch(user);
        tracker.remove(user);
        assert_eq!(tracker.tracked_count(), 0);
        assert!(tracker.last_seen(user).is_none());
    }
}
