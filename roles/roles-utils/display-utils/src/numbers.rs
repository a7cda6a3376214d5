use regex::Regex;
use std::sync::OnceLock;

use crate::UNAVAILABLE;

// Thresholds are checked largest first.
const SUFFIXES: &[(f64, &str)] = &[(1e12, "T"), (1e9, "G"), (1e6, "M"), (1e3, "K")];

static LEADING_FLOAT: OnceLock<Regex> = OnceLock::new();

fn leading_float() -> &'static Regex {
    LEADING_FLOAT.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static float pattern")
    })
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Mirrors how the pool's own frontend reads numbers: `"123.4 extra"` parses
/// as `123.4`, while text with no leading digits yields `None`.
pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let prefix = leading_float().find(trimmed)?;
    prefix.as_str().parse::<f64>().ok()
}

/// Render a magnitude with a metric suffix (`K`, `M`, `G`, `T`) and two decimals.
///
/// Values below 1000 are rendered with thousands grouping and up to three
/// fractional digits. Missing, non-finite, zero and negative values are
/// [`UNAVAILABLE`].
pub fn scale_with_suffix(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => return UNAVAILABLE.to_string(),
    };

    for &(threshold, suffix) in SUFFIXES {
        if value >= threshold {
            return format!("{:.2} {}", value / threshold, suffix);
        }
    }

    format_grouped(value, 3)
}

/// Format a number with comma thousands separators, rounding to at most
/// `max_fraction_digits` and dropping trailing fractional zeros.
pub fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }

    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac)) => (int_part, frac.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let rounds_to_zero = !fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if value.is_sign_negative() && !rounds_to_zero {
        out.push('-');
    }

    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
