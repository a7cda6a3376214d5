use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Format a moment as `Oct 18, 02:03:04 PM`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%b %-d, %I:%M:%S %p").to_string()
}

/// Current local time, formatted with [`format_timestamp`].
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}
