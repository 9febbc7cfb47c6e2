//! Local calendar dates and the clock that supplies "today".
//!
//! Dates are exchanged as `YYYY-MM-DD` in the user's local calendar. They are
//! never routed through UTC timestamps, so a date cannot shift by a day
//! depending on the machine's timezone.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Utc};

const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string as a local calendar date
pub fn parse_local_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), API_DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("{:?}: {}", s, e)))
}

/// Lenient variant for stored values such as a date of birth
///
/// Accepts a plain date or an RFC 3339 timestamp, whose date part is kept
/// as written. Returns `None` instead of an error.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    parse_local_date(s).ok().or_else(|| {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Format a date the way the REST API expects it
pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Sunday = 0 .. Saturday = 6, as browsers number weekdays
pub fn sunday_based_weekday(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Convert a Sunday = 0 weekday into the Monday = 0 convention
pub fn sunday_to_monday_based(weekday: u8) -> u8 {
    if weekday == 0 {
        6
    } else {
        weekday - 1
    }
}

/// Source of the current time
///
/// Everything that needs "now" or "today" takes a clock so that reports and
/// session expiry are reproducible in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Today's date in the user's local calendar
    fn today(&self) -> NaiveDate;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed instant
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.date_naive(),
        }
    }

    /// Midnight UTC of `today`, with `today` as the local date
    pub fn on(today: NaiveDate) -> Self {
        let now = today.and_time(NaiveTime::MIN).and_utc();
        Self { now, today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_date() {
        let date = parse_local_date("2024-03-09").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(format_api_date(date), "2024-03-09");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_local_date("09/03/2024"),
            Err(Error::InvalidDate(_))
        ));
        assert!(parse_local_date("2024-02-30").is_err());
    }

    #[test]
    fn test_lenient_keeps_written_date() {
        // Late evening with an offset must not roll over to the next day
        let date = parse_date_lenient("1990-01-01T23:30:00-08:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert_eq!(parse_date_lenient("not a date"), None);
    }

    #[test]
    fn test_weekday_conversion() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(sunday_based_weekday(sunday), 0);
        assert_eq!(sunday_to_monday_based(sunday_based_weekday(sunday)), 6);
        assert_eq!(sunday_to_monday_based(sunday_based_weekday(monday)), 0);
    }

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let clock = FixedClock::on(day);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.now().date_naive(), day);
    }
}
