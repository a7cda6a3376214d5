use regex::Regex;
use std::sync::OnceLock;

use crate::{is_missing, numbers::parse_float, UNAVAILABLE};

const DAYS_PER_YEAR: f64 = 365.0;

static HASHRATE_PATTERN: OnceLock<Regex> = OnceLock::new();
static DAYS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn hashrate_pattern() -> &'static Regex {
    HASHRATE_PATTERN
        .get_or_init(|| Regex::new(r"(?i)([\d,.]+)\s*([a-z]+/s)").expect("static hashrate pattern"))
}

fn days_pattern() -> &'static Regex {
    DAYS_PATTERN.get_or_init(|| Regex::new(r"(?i)([\d,.]+)\s*days?").expect("static days pattern"))
}

/// Parse a comma-grouped number captured by one of the patterns above.
fn parse_grouped(digits: &str) -> Option<f64> {
    parse_float(&digits.replace(',', ""))
}

/// Convert a textual hashrate such as `"1,234.5 GH/s"` to terahashes per second.
///
/// The output is always `"<value with 2 decimals> TH/s"`. Text that does not look
/// like a hashrate, or carries an unknown unit, is returned unchanged.
pub fn normalize_hashrate(text: Option<&str>) -> String {
    let raw = match text {
        Some(t) if !is_missing(text) => t,
        _ => return UNAVAILABLE.to_string(),
    };

    let Some(caps) = hashrate_pattern().captures(raw) else {
        return raw.to_string();
    };
    let Some(value) = parse_grouped(&caps[1]) else {
        return raw.to_string();
    };

    let terahashes = match caps[2].to_ascii_uppercase().as_str() {
        "H/S" => value / 1e12,
        "KH/S" => value / 1e9,
        "MH/S" => value / 1e6,
        "GH/S" => value / 1e3,
        "TH/S" => value,
        "PH/S" => value * 1e3,
        _ => return raw.to_string(),
    };

    format!("{:.2} TH/s", terahashes)
}

fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Convert an expected-time string such as `"400.7 days"` into years and days.
///
/// A year is a flat 365 days; both the year and the day counts are floored.
pub fn normalize_time_estimate(text: Option<&str>) -> String {
    let raw = match text {
        Some(t) if !is_missing(text) => t,
        _ => return UNAVAILABLE.to_string(),
    };

    let Some(caps) = days_pattern().captures(raw) else {
        return raw.to_string();
    };
    let Some(total_days) = parse_grouped(&caps[1]) else {
        return raw.to_string();
    };

    let years = (total_days / DAYS_PER_YEAR).floor() as u64;
    let days = (total_days % DAYS_PER_YEAR).floor() as u64;

    if years == 0 {
        pluralize(days, "day")
    } else if days == 0 {
        pluralize(years, "year")
    } else {
        format!("{}, {}", pluralize(years, "year"), pluralize(days, "day"))
    }
}
