//! Milestone detection between successive stats records.
//!
//! [`detect_changes`] is pure: it takes the prior baseline and a new record
//! and returns the next baseline plus the alerts to raise. Executing those
//! alerts is the job of [`crate::alerts::AlertDispatcher`].

use stats::MetricRecord;

/// Comparison baseline for the two watched metrics. Zero means "not seeded yet".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchedState {
    pub previous_best_share: f64,
    pub previous_difficulty: f64,
}

impl WatchedState {
    pub fn best_share_established(&self) -> bool {
        self.previous_best_share > 0.0
    }

    pub fn difficulty_established(&self) -> bool {
        self.previous_difficulty > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    /// The best share rose above the previous observation
    NewBestShare { value: f64 },
    /// Network difficulty differs from the previous observation
    DifficultyChanged { value: f64 },
}

/// Compare `record` against `prior`.
///
/// Unreadable values neither alert nor move the baseline. Any readable value
/// becomes the new baseline, including a lower best share, so a later rise
/// past that lower value alerts again.
pub fn detect_changes(prior: WatchedState, record: &MetricRecord) -> (WatchedState, Vec<Alert>) {
    let mut next = prior;
    let mut alerts = Vec::new();

    if let Some(best_share) = record.best_share() {
        if prior.best_share_established() && best_share > prior.previous_best_share {
            alerts.push(Alert::NewBestShare { value: best_share });
        }
        next.previous_best_share = best_share;
    }

    if let Some(difficulty) = record.difficulty() {
        if prior.difficulty_established() && difficulty != prior.previous_difficulty {
            alerts.push(Alert::DifficultyChanged { value: difficulty });
        }
        next.previous_difficulty = difficulty;
    }

    (next, alerts)
}
