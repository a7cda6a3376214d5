//! Display formatting shared by the solo mining monitor.
//!
//! Every function here is total: malformed or missing input degrades to
//! [`UNAVAILABLE`] or to the raw input, never to an error.

pub mod numbers;
pub mod time;
pub mod units;

pub use numbers::{format_grouped, parse_float, scale_with_suffix};
pub use time::{format_timestamp, now_timestamp};
pub use units::{normalize_hashrate, normalize_time_estimate};

/// Placeholder rendered for values that are missing or cannot be shown.
pub const UNAVAILABLE: &str = "Unavailable";

/// True when a textual metric carries no usable value at all.
pub(crate) fn is_missing(text: Option<&str>) -> bool {
    match text {
        None => true,
        Some(t) => t.is_empty() || t == UNAVAILABLE,
    }
}
