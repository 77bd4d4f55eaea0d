use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use tracing::warn;

/// Default rendering of time bounds: `YYYY-MM-DD HH:mm:ss`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Check that a strftime pattern is usable
pub fn is_valid_format(pattern: &str) -> bool {
    !pattern.is_empty() && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

/// Render `instant` with `pattern`, or with [`DEFAULT_DATE_FORMAT`] if the
/// pattern is invalid
pub fn format_instant(instant: &NaiveDateTime, pattern: &str) -> String {
    if is_valid_format(pattern) {
        instant.format(pattern).to_string()
    } else {
        warn!("dates: invalid format {:?}, using default", pattern);
        instant.format(DEFAULT_DATE_FORMAT).to_string()
    }
}
