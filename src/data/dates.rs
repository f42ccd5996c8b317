//! Mixed-Format Date Parsing
//! Infers calendar dates from a column whose values use different textual layouts.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Date-only layouts, tried in order. Month-first comes before day-first so
/// that ambiguous values like `01/02/2017` resolve to January 2nd.
const DATE_FORMATS: [&str; 17] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y%m%d",
    "%Y.%m.%d",
];

/// Layouts carrying a time of day. The time is dropped after parsing.
const DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M",
];

/// Parse a single date string, accepting any of the known layouts.
///
/// Returns `None` when no layout matches or the result has an implausible
/// year (e.g. `4/15/17` read through a four-digit year pattern).
pub fn parse_mixed_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    let from_date = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .find(is_plausible);
    if from_date.is_some() {
        return from_date;
    }

    DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .find(is_plausible)
}

fn is_plausible(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Convert a date to days since the Unix epoch (polars `Date` physical value).
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`to_epoch_days`].
pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

fn unix_epoch() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_us_and_iso_forms_agree() {
        assert_eq!(parse_mixed_date("4/15/2017"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("2017-04-15"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_ambiguous_is_month_first() {
        assert_eq!(parse_mixed_date("01/02/2017"), Some(ymd(2017, 1, 2)));
    }

    #[test]
    fn test_day_first_when_month_impossible() {
        assert_eq!(parse_mixed_date("15/04/2017"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_mixed_date("4/15/17"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_mixed_date("15-Apr-2017"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("Apr 15, 2017"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("April 15, 2017"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("15 April 2017"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_datetimes_drop_time() {
        assert_eq!(
            parse_mixed_date("2017-04-15 13:45:00"),
            Some(ymd(2017, 4, 15))
        );
        assert_eq!(
            parse_mixed_date("2017-04-15T13:45:00Z"),
            Some(ymd(2017, 4, 15))
        );
        assert_eq!(parse_mixed_date("4/15/2017 9:30"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_other_layouts() {
        assert_eq!(parse_mixed_date("15.04.2017"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("2017/04/15"), Some(ymd(2017, 4, 15)));
        assert_eq!(parse_mixed_date("20170415"), Some(ymd(2017, 4, 15)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_mixed_date(""), None);
        assert_eq!(parse_mixed_date("not a date"), None);
        assert_eq!(parse_mixed_date("13/13/2017"), None);
    }

    #[test]
    fn test_epoch_days() {
        let date = ymd(2017, 4, 15);
        assert_eq!(to_epoch_days(ymd(1970, 1, 1)), 0);
        assert_eq!(to_epoch_days(date), 17271);
        assert_eq!(to_epoch_days(ymd(1969, 12, 31)), -1);
        assert_eq!(from_epoch_days(17271), Some(date));
        assert_eq!(from_epoch_days(to_epoch_days(date)), Some(date));
    }
}
