//! Date utilities

use chrono::{Local, NaiveDate};

/// Format used for schedule day keys (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get the current local calendar date
///
/// Fed to the transformer as the last-resort schedule date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as a schedule day key
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_returns_recent_date() {
        let date = today();
        assert!(date > NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(date < NaiveDate::from_ymd_opt(2100, 1, 1).unwrap());
    }

    #[test]
    fn test_format_date_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(date), "2024-03-01");
    }

    #[test]
    fn test_format_date_is_ten_chars() {
        assert_eq!(format_date(today()).len(), 10);
    }
}
