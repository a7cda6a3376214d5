use display_utils::scale_with_suffix;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{FileStore, SHARE_HISTORY_KEY};

/// One best-share milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "share")]
    pub raw_value: f64,
    #[serde(rename = "formatted")]
    pub display_value: String,
    pub timestamp: String,
}

/// Bounded, newest-first log of best-share milestones.
///
/// Index 0 is always the most recent entry. Every append is written through
/// to the store immediately.
pub struct ShareHistory {
    entries: Vec<HistoryEntry>,
    max_items: usize,
    store: Arc<FileStore>,
}

impl ShareHistory {
    /// Load the persisted history; a missing or unreadable document yields an empty log.
    /// Capacity is at least one entry.
    pub fn load(store: Arc<FileStore>, max_items: usize) -> Self {
        let max_items = max_items.max(1);
        let mut entries: Vec<HistoryEntry> = store.get_or(SHARE_HISTORY_KEY, Vec::new());
        entries.truncate(max_items);
        debug!("Loaded {} share history entries", entries.len());

        Self {
            entries,
            max_items,
            store,
        }
    }

    /// Record a new milestone at the front, evicting the oldest past `max_items`
    pub fn append(&mut self, raw_value: f64, timestamp: String) -> &HistoryEntry {
        let entry = HistoryEntry {
            raw_value,
            display_value: scale_with_suffix(Some(raw_value)),
            timestamp,
        };
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_items);
        self.persist();

        &self.entries[0]
    }

    fn persist(&self) {
        if let Err(e) = self.store.set(SHARE_HISTORY_KEY, &self.entries) {
            warn!("Failed to save share history: {}", e);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
