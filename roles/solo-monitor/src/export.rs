use chrono::{DateTime, SecondsFormat, Utc};
use stats::MetricRecord;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ExportError;

/// File name for an export taken at `at`, e.g.
/// `btc-mining-stats-2026-10-18T14-03-04-123Z.csv`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("btc-mining-stats-{}.csv", stamp)
}

/// Write the current record as a two-line CSV (wire field names, then raw
/// values) into `dir`. Returns the path written.
pub fn export_csv(
    record: Option<&MetricRecord>,
    dir: &Path,
    at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let fields = record.map(MetricRecord::wire_fields).unwrap_or_default();
    if fields.is_empty() {
        return Err(ExportError::NoData);
    }

    let path = dir.join(export_file_name(at));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(fields.iter().map(|(name, _)| *name))?;
    writer.write_record(fields.iter().map(|(_, value)| value.as_str()))?;
    writer.flush()?;

    info!("Exported {} fields to {}", fields.len(), path.display());
    Ok(path)
}
