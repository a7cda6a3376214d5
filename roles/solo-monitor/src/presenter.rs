use display_utils::{
    format_grouped, normalize_hashrate, normalize_time_estimate, scale_with_suffix, UNAVAILABLE,
};
use stats::{MetricRecord, RawValue};
use std::time::Duration;

use crate::history::HistoryEntry;

/// How long a transient toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(3);
/// How long an error banner stays visible
pub const ERROR_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Every display string for one processed record
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFields {
    pub address: String,
    pub workers: String,
    pub shares: String,
    pub last_block: String,
    pub hashrate_1hr: String,
    pub hashrate_5m: String,
    pub chance_per_block: String,
    pub chance_per_day: String,
    pub time_estimate: String,
    pub best_share: String,
    pub difficulty: String,
    pub last_updated: String,
}

fn shown_or_unavailable(value: &Option<RawValue>) -> String {
    value
        .as_ref()
        .and_then(RawValue::shown)
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn text_of(value: &Option<RawValue>) -> Option<String> {
    value.as_ref().map(RawValue::to_string)
}

impl DisplayFields {
    pub fn from_record(record: &MetricRecord, last_updated: String) -> Self {
        let address = record
            .address
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNAVAILABLE.to_string());

        let difficulty = record
            .difficulty()
            .map(|d| format_grouped(d, 0))
            .unwrap_or_else(|| UNAVAILABLE.to_string());

        Self {
            address,
            workers: scale_with_suffix(record.worker_count()),
            shares: shown_or_unavailable(&record.share_count),
            last_block: shown_or_unavailable(&record.last_block_height),
            hashrate_1hr: normalize_hashrate(text_of(&record.hashrate_1hr).as_deref()),
            hashrate_5m: normalize_hashrate(text_of(&record.hashrate_5m).as_deref()),
            chance_per_block: shown_or_unavailable(&record.chance_per_block),
            chance_per_day: shown_or_unavailable(&record.chance_per_day),
            time_estimate: normalize_time_estimate(text_of(&record.time_estimate).as_deref()),
            best_share: scale_with_suffix(record.best_share()),
            difficulty,
            last_updated,
        }
    }
}

/// Status line text for the auto-refresh indicator
pub fn refresh_status_text(enabled: bool, period: Duration) -> String {
    if enabled {
        format!(
            "Auto-refresh: ON ({}s)",
            format_grouped(period.as_secs_f64(), 3)
        )
    } else {
        "Auto-refresh: OFF".to_string()
    }
}

/// The display surface. Implementations decide how things are drawn and when
/// transient messages disappear; the monitor only says what to show.
pub trait Presenter: Send + Sync {
    fn render_stats(&self, fields: &DisplayFields);

    fn render_history(&self, entries: &[HistoryEntry]);

    /// Transient message, dismissed after [`TOAST_DURATION`]
    fn toast(&self, message: &str, severity: Severity);

    /// Error banner, dismissed after [`ERROR_DURATION`]
    fn error(&self, message: &str);

    /// Emphasize the best share value for `duration`, then drop the emphasis
    fn highlight_best_share(&self, duration: Duration);

    fn loading(&self, active: bool);

    fn refresh_status(&self, enabled: bool, period: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_from_full_record() {
        let record: MetricRecord = serde_json::from_str(
            r#"{
                "address": "bc1qxyz",
                "workers": 3,
                "shares": "1,204,332",
                "lastBlock": "871234",
                "hashrate1hr": "1,500 GH/s",
                "hashrate5m": "980 GH/s",
                "chancePerBlock": "0.0000012%",
                "chancePerDay": "0.00017%",
                "timeEstimate": "400 days",
                "bestshare": "2500000000",
                "difficulty": 126411437451912.23
            }"#,
        )
        .unwrap();

        let fields = DisplayFields::from_record(&record, "Oct 18, 02:03:04 PM".to_string());
        assert_eq!(fields.address, "bc1qxyz");
        assert_eq!(fields.workers, "3");
        assert_eq!(fields.shares, "1,204,332");
        assert_eq!(fields.last_block, "871234");
        assert_eq!(fields.hashrate_1hr, "1.50 TH/s");
        assert_eq!(fields.hashrate_5m, "0.98 TH/s");
        assert_eq!(fields.chance_per_block, "0.0000012%");
        assert_eq!(fields.time_estimate, "1 year, 35 days");
        assert_eq!(fields.best_share, "2.50 G");
        assert_eq!(fields.difficulty, "126,411,437,451,912");
        assert_eq!(fields.last_updated, "Oct 18, 02:03:04 PM");
    }

    #[test]
    fn test_fields_from_empty_record() {
        let fields = DisplayFields::from_record(&MetricRecord::default(), String::new());
        assert_eq!(fields.address, UNAVAILABLE);
        assert_eq!(fields.workers, UNAVAILABLE);
        assert_eq!(fields.shares, UNAVAILABLE);
        assert_eq!(fields.hashrate_1hr, UNAVAILABLE);
        assert_eq!(fields.time_estimate, UNAVAILABLE);
        assert_eq!(fields.best_share, UNAVAILABLE);
        assert_eq!(fields.difficulty, UNAVAILABLE);
    }

    #[test]
    fn test_zero_workers_and_shares_are_unavailable() {
        let record: MetricRecord =
            serde_json::from_str(r#"{"workers": 0, "shares": 0, "lastBlock": ""}"#).unwrap();
        let fields = DisplayFields::from_record(&record, String::new());
        assert_eq!(fields.workers, UNAVAILABLE);
        assert_eq!(fields.shares, UNAVAILABLE);
        assert_eq!(fields.last_block, UNAVAILABLE);
    }

    #[test]
    fn test_refresh_status_text() {
        assert_eq!(
            refresh_status_text(true, Duration::from_millis(5000)),
            "Auto-refresh: ON (5s)"
        );
        assert_eq!(
            refresh_status_text(true, Duration::from_millis(2500)),
            "Auto-refresh: ON (2.5s)"
        );
        assert_eq!(
            refresh_status_text(false, Duration::from_millis(5000)),
            "Auto-refresh: OFF"
        );
    }
}
