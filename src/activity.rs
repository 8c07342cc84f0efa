//! Rolling activity log shown under the control panel

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use tracing::info;

/// Messages kept on screen
pub const ACTIVITY_CAPACITY: usize = 13;

/// Most recent messages, newest last, each stamped `[HH:MM:SS]`
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<String>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current local time
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(message, Local::now());
    }

    pub fn push_at(&mut self, message: impl Into<String>, at: DateTime<Local>) {
        let message = message.into();
        info!(target: "activity", "{}", message);

        if self.entries.len() == ACTIVITY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries
            .push_back(format!("[{}] {}", at.format("%H:%M:%S"), message));
    }

    /// Oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_prefix() {
        let mut log = ActivityLog::new();
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        log.push_at("[SYS] Firmware simulation active.", at);
        assert_eq!(log.latest(), Some("[14:05:07] [SYS] Firmware simulation active."));
    }

    #[test]
    fn test_keeps_most_recent() {
        let mut log = ActivityLog::new();
        for i in 0..20 {
            log.push(format!("msg {i}"));
        }
        assert_eq!(log.len(), ACTIVITY_CAPACITY);
        let first = log.entries().next().unwrap();
        assert!(first.ends_with("msg 7"));
        assert!(log.latest().unwrap().ends_with("msg 19"));
    }
}
