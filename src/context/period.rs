//! Filters pinning a clicked x-axis period

use chrono::{DateTime, Duration, Months, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::filter::{Conjunction, Filter, FilterOp};

const PERIOD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn grain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:(?P<y>\d+(?:\.\d+)?)Y)?(?:(?P<mo>\d+)M)?(?:(?P<w>\d+)W)?(?:(?P<d>\d+)D)?(?:T(?:(?P<h>\d+)H)?(?:(?P<mi>\d+)M)?(?:(?P<s>\d+)S)?)?$",
        )
        .expect("Invalid time grain regex")
    })
}

/// Length of one x-axis bucket, from an ISO 8601 `time_grain_sqla`
///
/// Calendar months (fractional years included) are kept apart from the
/// fixed-length part so month ends land where a calendar puts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrain {
    months: u32,
    fixed: Duration,
}

impl TimeGrain {
    /// Parse `P1D`, `PT5M`, `P0.25Y`, ...; an anchored grain such as
    /// `P1W/1970-01-03T00:00:00Z` is read up to the `/`
    pub fn parse(grain: &str) -> Option<TimeGrain> {
        let grain = grain.split('/').next()?.trim();
        let caps = grain_regex().captures(grain)?;
        let number = |name: &str| -> Option<i64> {
            caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
        };

        let years: f64 = caps.name("y").map_or(Ok(0.0), |m| m.as_str().parse())
            .ok()?;
        let months = (years * 12.0).round() as i64 + number("mo")?;
        let fixed = Duration::try_weeks(number("w")?)?
            .checked_add(&Duration::try_days(number("d")?)?)?
            .checked_add(&Duration::try_hours(number("h")?)?)?
            .checked_add(&Duration::try_minutes(number("mi")?)?)?
            .checked_add(&Duration::try_seconds(number("s")?)?)?;

        if months == 0 && fixed == Duration::zero() {
            return None;
        }
        Some(TimeGrain {
            months: u32::try_from(months).ok()?,
            fixed,
        })
    }

    /// Start of the bucket after the one starting at `start`
    pub fn end_of(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        start
            .checked_add_months(Months::new(self.months))?
            .checked_add_signed(self.fixed)
    }
}

fn utc_instant(x: &Value) -> Option<DateTime<Utc>> {
    let millis = match x {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }?;
    Utc.timestamp_millis_opt(millis).single()
}

/// Render an x-axis timestamp (epoch millis) as `YYYY-MM-DD HH:MM:SS` UTC;
/// anything else is kept as is
fn period_value(x: &Value) -> Value {
    match utc_instant(x) {
        Some(dt) => Value::String(dt.format(PERIOD_FORMAT).to_string()),
        None => x.clone(),
    }
}

fn bound(col: &str, op: FilterOp, at: NaiveDateTime) -> Filter {
    Filter {
        conjunction: Some(Conjunction::And),
        is_period: true,
        ..Filter::new(col, op, at.format(PERIOD_FORMAT).to_string())
    }
}

/// Bounds of the bucket containing `x` on a chart bucketed by `grain`
///
/// `[>= start, < end]`, or only `< end` when the clicked metric is a
/// cumulative total. `None` when `x` is not a timestamp or the grain is
/// unknown.
pub fn grain_bounds(col: &str, x: &Value, grain: &str, cumulative: bool) -> Option<Vec<Filter>> {
    let start = utc_instant(x)?.naive_utc();
    let end = TimeGrain::parse(grain)?.end_of(start)?;
    let filters = if cumulative {
        vec![bound(col, FilterOp::Lt, end)]
    } else {
        vec![bound(col, FilterOp::Ge, start), bound(col, FilterOp::Lt, end)]
    };
    Some(filters)
}

/// Filter on the exact clicked x value of a chart without a time grain
///
/// A cumulative total becomes `<= x`, flagged so it replaces the other
/// filters when composed.
pub fn point_filter(col: &str, x: &Value, cumulative: bool) -> Filter {
    if cumulative {
        Filter {
            is_cumulative_total: true,
            ..Filter::new(col, FilterOp::Le, period_value(x))
        }
    } else {
        Filter {
            is_period: true,
            ..Filter::new(col, FilterOp::Eq, period_value(x))
        }
    }
}
