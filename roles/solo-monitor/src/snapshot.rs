use stats::MetricRecord;

use crate::detector::{detect_changes, Alert, WatchedState};

/// Latest fetched record plus the baseline used for change detection
#[derive(Debug, Default)]
pub struct SnapshotStore {
    watched: WatchedState,
    current: Option<MetricRecord>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a freshly fetched record in, returning the alerts it triggers.
    /// Comparison always runs against the baseline from before this record.
    pub fn apply(&mut self, record: MetricRecord) -> Vec<Alert> {
        let (next, alerts) = detect_changes(self.watched, &record);
        self.watched = next;
        self.current = Some(record);
        alerts
    }

    pub fn current(&self) -> Option<&MetricRecord> {
        self.current.as_ref()
    }

    pub fn watched(&self) -> WatchedState {
        self.watched
    }
}
