use std::time::Duration;

use jiff::Timestamp;

/// Get the current UTC date and time as a string
pub fn time_now_utc() -> String {
    Timestamp::now().to_string()
}

/// Format a duration as seconds with microsecond precision
pub fn format_secs(duration: Duration) -> String {
    format!("{:.6}", duration.as_secs_f64())
}
