//! Named in-memory logs

use std::collections::VecDeque;
use std::sync::Mutex;

use time::OffsetDateTime;

use hearth_core::{LogEntry, LogHandle};

/// Hard cap per log, oldest entries fall off first
const MAX_ENTRIES: usize = 1024;

pub(crate) struct MemoryLog {
    name: String,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl MemoryLog {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn append(&self, level: &str, message: &str) {
        let mut entries = self.entries.lock().expect("log lock poisoned");
        if entries.len() == MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            time: OffsetDateTime::now_utc(),
            level: level.to_string(),
            message: message.to_string(),
        });
    }

    #[cfg(test)]
    pub(crate) fn last_entries(&self, n: usize) -> Vec<LogEntry> {
        self.last(n)
    }
}

impl LogHandle for MemoryLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn clean(&self, before: OffsetDateTime) {
        let mut entries = self.entries.lock().expect("log lock poisoned");
        entries.retain(|e| e.time >= before);
    }

    fn last(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock().expect("log lock poisoned");
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_last_returns_most_recent() {
        let log = MemoryLog::new("testlog".to_string());
        for i in 0..15 {
            log.append("INFO", &format!("entry {}", i));
        }

        let entries = log.last(10);
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].message, "entry 5");
        assert_eq!(entries[9].message, "entry 14");
    }

    #[test]
    fn test_clean_drops_older_entries() {
        let log = MemoryLog::new("testlog".to_string());
        log.append("INFO", "old");
        log.clean(OffsetDateTime::now_utc() + Duration::from_secs(1));
        assert!(log.last(10).is_empty());
    }

    #[test]
    fn test_clean_keeps_newer_entries() {
        let log = MemoryLog::new("testlog".to_string());
        log.append("INFO", "fresh");
        log.clean(OffsetDateTime::now_utc() - Duration::from_secs(60));
        assert_eq!(log.last(10).len(), 1);
    }
}
