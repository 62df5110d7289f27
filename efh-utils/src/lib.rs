//! Shared utility functions for EFH crates.

/// Date utility functions
pub mod dates {
    use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

    /// Date format used throughout the forecast hub files: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Parse a date that may also carry a time component.
    ///
    /// Accepts plain "YYYY-MM-DD", RFC 3339 timestamps ("2021-03-08T00:00:00Z")
    /// and naive ISO timestamps ("2021-03-08T00:00:00.000"). Only the calendar
    /// date is kept.
    pub fn parse_date_lenient(s: &str) -> anyhow::Result<NaiveDate> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Ok(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(dt.date());
        }
        anyhow::bail!("unrecognised date '{}'", s)
    }

    /// Midnight at the start of `date`.
    pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }

    /// Signed number of whole days from `right` to `left`.
    pub fn difference_in_days(left: NaiveDate, right: NaiveDate) -> i64 {
        (left - right).num_days()
    }

    /// The reporting Saturday preceding the week a forecast was issued in.
    ///
    /// The date is moved forward to the Saturday closing its Sunday-based
    /// week (a Saturday stays put) and then one week is subtracted.
    pub fn previous_reporting_saturday(date: NaiveDate) -> NaiveDate {
        let saturday = if date.weekday() == Weekday::Sat {
            date
        } else {
            let ahead = 6 - i64::from(date.weekday().num_days_from_sunday());
            date + TimeDelta::days(ahead)
        };
        saturday - TimeDelta::days(7)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_date_lenient() {
            let expected = NaiveDate::from_ymd_opt(2021, 3, 8).unwrap();
            assert_eq!(parse_date_lenient("2021-03-08").unwrap(), expected);
            assert_eq!(parse_date_lenient("2021-03-08T00:00:00Z").unwrap(), expected);
            assert_eq!(parse_date_lenient("2021-03-08T00:00:00.000").unwrap(), expected);
            assert!(parse_date_lenient("08/03/2021").is_err());
        }

        #[test]
        fn test_previous_reporting_saturday_midweek() {
            // Wednesday -> Saturday 2023-05-13 -> minus one week
            let wednesday = NaiveDate::from_ymd_opt(2023, 5, 10).unwrap();
            assert_eq!(
                previous_reporting_saturday(wednesday),
                NaiveDate::from_ymd_opt(2023, 5, 6).unwrap()
            );
        }

        #[test]
        fn test_previous_reporting_saturday_on_saturday() {
            let saturday = NaiveDate::from_ymd_opt(2023, 5, 6).unwrap();
            assert_eq!(
                previous_reporting_saturday(saturday),
                NaiveDate::from_ymd_opt(2023, 4, 29).unwrap()
            );
        }

        #[test]
        fn test_previous_reporting_saturday_on_sunday() {
            // Sunday starts a new week, so it snaps to the following Saturday
            let sunday = NaiveDate::from_ymd_opt(2023, 5, 7).unwrap();
            assert_eq!(
                previous_reporting_saturday(sunday),
                NaiveDate::from_ymd_opt(2023, 5, 6).unwrap()
            );
        }

        #[test]
        fn test_difference_in_days() {
            let a = NaiveDate::from_ymd_opt(2023, 5, 20).unwrap();
            let b = NaiveDate::from_ymd_opt(2023, 5, 13).unwrap();
            assert_eq!(difference_in_days(a, b), 7);
            assert_eq!(difference_in_days(b, a), -7);
        }
    }
}

/// Number formatting for tooltips and legends (en locale grouping).
pub mod numbers {
    /// Round half up to `digits` decimal places.
    pub fn round(value: f64, digits: u32) -> f64 {
        let exp = 10f64.powi(digits as i32);
        ((value + f64::EPSILON) * exp + 0.5).floor() / exp
    }

    /// Format a value as a grouped integer, e.g. `1234567.4` -> `"1,234,567"`.
    pub fn format_int(value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let rounded = round(value, 0);
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{}{}", sign, group_thousands(&format!("{:.0}", rounded.abs())))
    }

    /// Format a value with at most `digits` decimals, trailing zeros trimmed.
    pub fn format_decimal(value: f64, digits: u32) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let rounded = round(value, digits);
        let text = format!("{:.*}", digits as usize, rounded.abs());
        let (int_part, fraction) = match text.split_once('.') {
            Some((i, f)) => (i, f.trim_end_matches('0')),
            None => (text.as_str(), ""),
        };
        let sign = if rounded < 0.0 { "-" } else { "" };
        if fraction.is_empty() {
            format!("{}{}", sign, group_thousands(int_part))
        } else {
            format!("{}{}.{}", sign, group_thousands(int_part), fraction)
        }
    }

    /// Integers print without decimals, everything else with up to two.
    pub fn format(value: f64) -> String {
        if value.fract() == 0.0 {
            format_int(value)
        } else {
            format_decimal(value, 2)
        }
    }

    fn group_thousands(digits: &str) -> String {
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

}
