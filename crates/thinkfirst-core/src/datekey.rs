//! Calendar-local bucket keys.
//!
//! Every accounting bucket is keyed by the *local* calendar date of the
//! event. Bucketing by UTC shifts the day boundary and attributes prompts to
//! the wrong local day for anyone west or east of Greenwich. Keys are plain
//! strings (`YYYY-MM-DD` / `YYYY-MM`) so lexicographic order is calendar
//! order.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::error::BucketKeyError;

/// `YYYY-MM-DD`, local timezone.
pub type DayKey = String;

/// `YYYY-MM`, local timezone.
pub type MonthKey = String;

/// The instant's calendar date in the local timezone.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Day key for the instant's local calendar date.
pub fn local_day_key(at: DateTime<Utc>) -> DayKey {
    day_key(local_date(at))
}

/// Month key for the instant's local calendar date.
pub fn local_month_key(at: DateTime<Utc>) -> MonthKey {
    local_day_key(at)[..7].to_string()
}

/// Format a date as a day key.
pub fn day_key(date: NaiveDate) -> DayKey {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Format a date as a month key.
pub fn month_key(date: NaiveDate) -> MonthKey {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Day key for the local day before `at`.
pub fn yesterday_key(at: DateTime<Utc>) -> DayKey {
    let today = local_date(at);
    day_key(today.pred_opt().unwrap_or(today))
}

/// Parse a `YYYY-MM-DD` key back into a date.
///
/// Fails on the wrong field count, non-numeric fields, or out-of-range
/// calendar values. Callers recover (substituting the current date or
/// skipping the entry) rather than propagate.
pub fn parse_day_key(key: &str) -> Result<NaiveDate, BucketKeyError> {
    let err = |reason: &str| BucketKeyError {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() != 3 {
        return Err(err("expected three '-'-separated fields"));
    }
    let year: i32 = parts[0].parse().map_err(|_| err("non-numeric year"))?;
    let month: u32 = parts[1].parse().map_err(|_| err("non-numeric month"))?;
    let day: u32 = parts[2].parse().map_err(|_| err("non-numeric day"))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| err("out-of-range calendar date"))
}

/// Whole-day difference `b - a`.
///
/// Calendar-date subtraction, not millisecond math -- dividing a millisecond
/// delta by 86_400_000 goes wrong on the 23- and 25-hour days around DST
/// transitions.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_formatting() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_key(date), "2024-03-07");
        assert_eq!(month_key(date), "2024-03");
    }

    #[test]
    fn test_parse_day_key_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(parse_day_key(&day_key(date)).unwrap(), date);
    }

    #[test]
    fn test_parse_day_key_rejects_wrong_field_count() {
        assert!(parse_day_key("2024-05").is_err());
        assert!(parse_day_key("2024-05-01-extra").is_err());
        assert!(parse_day_key("").is_err());
    }

    #[test]
    fn test_parse_day_key_rejects_non_numeric() {
        assert!(parse_day_key("20a4-05-01").is_err());
        assert!(parse_day_key("2024-xx-01").is_err());
    }

    #[test]
    fn test_parse_day_key_rejects_out_of_range() {
        assert!(parse_day_key("2024-13-01").is_err());
        assert!(parse_day_key("2024-02-30").is_err());
    }

    #[test]
    fn test_days_between_spans_leap_day() {
        let a = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(days_between(a, b), 2);
        assert_eq!(days_between(b, a), -2);
    }

    #[test]
    fn test_local_keys_agree_with_local_date() {
        let now = Utc::now();
        let expected = day_key(local_date(now));
        assert_eq!(local_day_key(now), expected);
        assert_eq!(local_month_key(now), expected[..7].to_string());
    }
}
