//! Notification delivery preferences, including the do-not-disturb window.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::notification::kind::NotificationKind;

/// Per-user notification delivery preferences.
///
/// Consulted, never mutated, by the fan-out at delivery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    /// Master switch for realtime push delivery.
    pub push_enabled: bool,
    /// Master switch for email digests (delivered elsewhere).
    pub email_enabled: bool,
    /// Per-kind toggles.
    pub types: KindToggles,
    /// Quiet-hours window.
    pub do_not_disturb: DoNotDisturb,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            email_enabled: true,
            types: KindToggles::default(),
            do_not_disturb: DoNotDisturb::default(),
        }
    }
}

/// Per-kind delivery toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindToggles {
    pub likes: bool,
    pub comments: bool,
    pub follows: bool,
    pub messages: bool,
    pub calls: bool,
    pub mentions: bool,
    pub friend_requests: bool,
    pub system: bool,
}

impl Default for KindToggles {
    fn default() -> Self {
        Self {
            likes: true,
            comments: true,
            follows: true,
            messages: true,
            calls: true,
            mentions: true,
            friend_requests: true,
            system: true,
        }
    }
}

/// A user-configured time-of-day range during which notifications are
/// suppressed. Times are "HH:MM" in the user's configured timezone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DoNotDisturb {
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

impl NotificationPreferences {
    /// Whether a notification of the given kind should be delivered at
    /// the given local time.
    pub fn allows(&self, kind: NotificationKind, now: NaiveTime) -> bool {
        if !self.push_enabled {
            return false;
        }
        if !self.kind_enabled(kind) {
            return false;
        }
        !self.do_not_disturb.contains(now)
    }

    fn kind_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Like => self.types.likes,
            NotificationKind::Comment => self.types.comments,
            NotificationKind::Follow => self.types.follows,
            NotificationKind::Message => self.types.messages,
            NotificationKind::CallIncoming
            | NotificationKind::CallMissed
            | NotificationKind::CallEnded => self.types.calls,
            NotificationKind::System => self.types.system,
        }
    }
}

impl DoNotDisturb {
    /// Whether `now` falls inside the quiet window.
    ///
    /// A window whose start is later than its end wraps past midnight
    /// (e.g. 22:00–08:00), so membership is tested as an OR of the two
    /// day fragments; the same-day case is a plain range check.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if !self.enabled {
            return false;
        }
        let (Some(start), Some(end)) = (parse_hhmm(&self.start_time), parse_hhmm(&self.end_time))
        else {
            // Unparseable window never suppresses delivery.
            return false;
        };
        if start <= end {
            now >= start && now < end
        } else {
            now >= start || now < end
        }
    }
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn overnight_dnd() -> NotificationPreferences {
        NotificationPreferences {
            do_not_disturb: DoNotDisturb {
                enabled: true,
                start_time: "22:00".to_string(),
                end_time: "08:00".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn overnight_window_suppresses_late_and_early() {
        let prefs = overnight_dnd();
        assert!(!prefs.allows(NotificationKind::Like, t("23:30")));
        assert!(!prefs.allows(NotificationKind::Like, t("03:00")));
        assert!(prefs.allows(NotificationKind::Like, t("12:00")));
    }

    #[test]
    fn same_day_window() {
        let dnd = DoNotDisturb {
            enabled: true,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
        };
        assert!(dnd.contains(t("12:00")));
        assert!(!dnd.contains(t("08:59")));
        assert!(!dnd.contains(t("17:00")));
    }

    #[test]
    fn disabled_window_never_suppresses() {
        let dnd = DoNotDisturb {
            enabled: false,
            start_time: "00:00".to_string(),
            end_time: "23:59".to_string(),
        };
        assert!(!dnd.contains(t("12:00")));
    }

    #[test]
    fn push_disabled_blocks_everything() {
        let prefs = NotificationPreferences {
            push_enabled: false,
            ..Default::default()
        };
        assert!(!prefs.allows(NotificationKind::Message, t("12:00")));
    }

    #[test]
    fn kind_toggle_blocks_only_that_kind() {
        let prefs = NotificationPreferences {
            types: KindToggles {
                likes: false,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!prefs.allows(NotificationKind::Like, t("12:00")));
        assert!(prefs.allows(NotificationKind::Comment, t("12:00")));
    }

    #[test]
    fn call_kinds_share_one_toggle() {
        let prefs = NotificationPreferences {
            types: KindToggles {
                calls: false,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!prefs.allows(NotificationKind::CallIncoming, t("12:00")));
        assert!(!prefs.allows(NotificationKind::CallMissed, t("12:00")));
        assert!(!prefs.allows(NotificationKind::CallEnded, t("12:00")));
    }

    #[test]
    fn unparseable_window_is_ignored() {
        let dnd = DoNotDisturb {
            enabled: true,
            start_time: "not-a-time".to_string(),
            end_time: "08:00".to_string(),
        };
        assert!(!dnd.contains(t("03:00")));
    }
}
