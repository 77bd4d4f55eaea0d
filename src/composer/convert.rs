//! Column-type-aware rendering of drilldown values

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

use crate::datasource::ColumnType;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Render a clicked value the way a filter on a column of `column_type` expects it
///
/// Dates become `YYYY-MM-DD`, datetimes `YYYY-MM-DDTHH:MM:SS`, and anything
/// bound for a `VARCHAR` column becomes a string. Values that do not parse as
/// a date are passed through unchanged.
pub fn convert_for_sql(value: &Value, column_type: &ColumnType) -> Value {
    if let Some(pattern) = column_type.sql_date_format() {
        return match parse_instant(value) {
            Some(instant) => Value::String(instant.format(pattern).to_string()),
            None => value.clone(),
        };
    }

    if column_type.is_textual() {
        return match value {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other.clone(),
        };
    }

    value.clone()
}

/// Interpret a chart value as a local instant
///
/// Numbers are epoch milliseconds, strings are ISO-like date or date-time text.
fn parse_instant(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Local
                .timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.naive_local())
        }
        Value::String(s) => parse_instant_str(s.trim()),
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
