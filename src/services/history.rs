use std::collections::VecDeque;

use crate::models::HistoryEntry;

/// Interaction log, most recent first, capped at `capacity` entries
///
/// Appending past the cap drops the oldest entries from the tail.
#[derive(Debug, Clone)]
pub(crate) struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryLog {
    /// Builds a log from persisted entries (most recent first), trimming to `capacity`
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        let mut log = Self {
            entries: entries.into(),
            capacity: capacity.max(1),
        };
        log.trim();
        log
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.trim();
    }

    /// Up to `limit` entries, most recent first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.trim();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    fn trim(&mut self) {
        self.entries.truncate(self.capacity);
    }
}
