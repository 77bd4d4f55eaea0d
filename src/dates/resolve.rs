//! Relative and absolute date expressions

use chrono::{Duration, Months, NaiveDateTime};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// How an expression was turned into an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `"<n> <unit> ago"` / `"<n> <unit> from now"`
    Relative,
    /// An embedded `YYYY-MM-DDTHH:mm:ss` literal
    Absolute,
    /// Nothing recognizable; the current instant was used
    Fallback,
}

/// Result of resolving a date expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInstant {
    pub instant: NaiveDateTime,
    pub resolution: Resolution,
}

impl ResolvedInstant {
    pub fn is_fallback(&self) -> bool {
        self.resolution == Resolution::Fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(s: &str) -> Option<Unit> {
        match s.to_lowercase().as_str() {
            "second" | "seconds" => Some(Unit::Second),
            "minute" | "minutes" => Some(Unit::Minute),
            "day" | "days" => Some(Unit::Day),
            "week" | "weeks" => Some(Unit::Week),
            "month" | "months" => Some(Unit::Month),
            "year" | "years" => Some(Unit::Year),
            _ => None,
        }
    }
}

fn relative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?P<count>\d+)\s+(?P<unit>[a-z]+)\s+(?P<direction>ago|from\s+now)")
            .expect("Invalid relative date regex")
    })
}

fn absolute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?P<date>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})")
            .expect("Invalid absolute date regex")
    })
}

/// Resolve `expression` against a given `now`
///
/// Relative expressions take priority over embedded literals. Anything
/// unrecognized resolves to `now` with [`Resolution::Fallback`].
pub fn resolve_at(expression: &str, now: NaiveDateTime) -> ResolvedInstant {
    if let Some(instant) = parse_relative(expression, now) {
        return ResolvedInstant {
            instant,
            resolution: Resolution::Relative,
        };
    }

    if let Some(instant) = parse_absolute(expression) {
        return ResolvedInstant {
            instant,
            resolution: Resolution::Absolute,
        };
    }

    debug!("dates: unrecognized expression {:?}, using now", expression);
    ResolvedInstant {
        instant: now,
        resolution: Resolution::Fallback,
    }
}

/// Apply the first phrase with a known unit
fn parse_relative(expression: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    relative_regex().captures_iter(expression).find_map(|caps| {
        let unit = Unit::parse(&caps["unit"])?;
        let count: i64 = caps["count"].parse().ok()?;
        let forward = !caps["direction"].eq_ignore_ascii_case("ago");
        shift(now, count, unit, forward)
    })
}

fn shift(now: NaiveDateTime, count: i64, unit: Unit, forward: bool) -> Option<NaiveDateTime> {

    match unit {
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year {
                count.checked_mul(12)?
            } else {
                count
            };
            let months = Months::new(u32::try_from(months).ok()?);
            if forward {
                now.checked_add_months(months)
            } else {
                now.checked_sub_months(months)
            }
        }
        _ => {
            let delta = match unit {
                Unit::Second => Duration::try_seconds(count)?,
                Unit::Minute => Duration::try_minutes(count)?,
                Unit::Day => Duration::try_days(count)?,
                _ => Duration::try_days(count.checked_mul(7)?)?,
            };
            if forward {
                now.checked_add_signed(delta)
            } else {
                now.checked_sub_signed(delta)
            }
        }
    }
}

fn parse_absolute(expression: &str) -> Option<NaiveDateTime> {
    let caps = absolute_regex().captures(expression)?;
    let literal = caps["date"].replace('t', "T");
    NaiveDateTime::parse_from_str(&literal, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Resolves date expressions against an injectable clock
#[derive(Clone)]
pub struct DateResolver {
    clock: Arc<dyn Clock>,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DateResolver {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The current instant of the resolver's clock
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Resolve an expression such as `"3 days ago"` or `"2019-01-14T01:32:10"`
    pub fn resolve(&self, expression: &str) -> ResolvedInstant {
        resolve_at(expression, self.clock.now())
    }
}

impl std::fmt::Debug for DateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_days_ago() {
        let now = at(2024, 3, 10, 12, 0, 0);
        let r = resolve_at("3 days ago", now);
        assert_eq!(r.instant, at(2024, 3, 7, 12, 0, 0));
        assert_eq!(r.resolution, Resolution::Relative);
    }

    #[test]
    fn test_weeks_from_now() {
        let now = at(2024, 3, 10, 12, 0, 0);
        let r = resolve_at("2 weeks from now", now);
        assert_eq!(r.instant, now + Duration::days(14));
    }

    #[test]
    fn test_singular_units_and_case() {
        let now = at(2024, 3, 10, 12, 0, 0);
        assert_eq!(resolve_at("1 Day Ago", now).instant, at(2024, 3, 9, 12, 0, 0));
        assert_eq!(resolve_at("90 seconds from now", now).instant, at(2024, 3, 10, 12, 1, 30));
        assert_eq!(resolve_at("5 minutes ago", now).instant, at(2024, 3, 10, 11, 55, 0));
    }

    #[test]
    fn test_months_and_years_use_calendar_arithmetic() {
        let now = at(2024, 3, 31, 8, 0, 0);
        assert_eq!(resolve_at("1 month ago", now).instant, at(2024, 2, 29, 8, 0, 0));
        assert_eq!(resolve_at("2 years from now", now).instant, at(2026, 3, 31, 8, 0, 0));
    }

    #[test]
    fn test_absolute_literal_anywhere() {
        let now = at(2024, 3, 10, 12, 0, 0);
        let r = resolve_at("since 2019-01-14T01:32:10 inclusive", now);
        assert_eq!(r.instant, at(2019, 1, 14, 1, 32, 10));
        assert_eq!(r.resolution, Resolution::Absolute);
    }

    #[test]
    fn test_relative_wins_over_absolute() {
        let now = at(2024, 3, 10, 12, 0, 0);
        let r = resolve_at("2019-01-14T01:32:10 or 1 day ago", now);
        assert_eq!(r.resolution, Resolution::Relative);
        assert_eq!(r.instant, at(2024, 3, 9, 12, 0, 0));
    }

    #[test]
    fn test_unknown_unit_does_not_hide_later_phrase() {
        let now = at(2024, 3, 10, 12, 0, 0);
        let r = resolve_at("3 fortnights ago, or else 2 days ago", now);
        assert_eq!(r.resolution, Resolution::Relative);
        assert_eq!(r.instant, at(2024, 3, 8, 12, 0, 0));
    }

    #[test]
    fn test_fallback_is_observable() {
        let now = at(2024, 3, 10, 12, 0, 0);
        for expr in ["", "yesterday", "3 fortnights ago", "2019-13-45T99:00:00"] {
            let r = resolve_at(expr, now);
            assert!(r.is_fallback(), "{expr:?} should fall back");
            assert_eq!(r.instant, now);
        }
    }

    #[test]
    fn test_resolver_uses_system_clock() {
        let resolver = DateResolver::default();
        let before = Local::now().naive_local();
        let r = resolver.resolve("3 days ago");
        let expected = before - Duration::days(3);
        assert!((r.instant - expected).num_seconds().abs() <= 1);
    }
}
