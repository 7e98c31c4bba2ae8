use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Longest window a single read may cover.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Accepted calendar years for request dates. Keeps all window arithmetic
/// far from chrono's representable range.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(AppError::Validation(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        let window = Self { start, end };
        if window.len_days() > MAX_WINDOW_DAYS {
            return Err(AppError::Validation(format!(
                "date range may cover at most {} days",
                MAX_WINDOW_DAYS
            )));
        }
        Ok(window)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset))
    }

    /// Half-open UTC instant bounds `[start 00:00, end+1 00:00)`.
    pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (start_of_day(self.start), start_of_day(self.end + Duration::days(1)))
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Monday of the ISO week containing `date`.
pub fn find_monday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday(); // Mon=0
    date - Duration::days(weekday as i64)
}

/// Monday-to-Sunday window containing `reference`.
pub fn week_window(reference: NaiveDate) -> DateWindow {
    let start = find_monday(reference);
    DateWindow {
        start,
        end: start + Duration::days(6),
    }
}

/// The `days` calendar days ending on (and including) `today`.
pub fn trailing_window(today: NaiveDate, days: u32) -> DateWindow {
    let span = (days.max(1) as i64).min(MAX_WINDOW_DAYS) - 1;
    DateWindow {
        start: today - Duration::days(span),
        end: today,
    }
}

/// Parse a `YYYY-MM-DD` request value within [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn parse_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{} must be a valid YYYY-MM-DD date", field)))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(AppError::Validation(format!(
            "{} must fall between years {} and {}",
            field, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(date)
}

/// Log dates may trail the client's local day but never run ahead of it by
/// more than one day.
pub fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if (date - today).num_days() > 1 {
        return Err(AppError::Validation(format!(
            "date {} is in the future",
            date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_window_wednesday() {
        let w = week_window(date(2024, 1, 10));
        assert_eq!(w.start, date(2024, 1, 8));
        assert_eq!(w.end, date(2024, 1, 14));
    }

    #[test]
    fn test_week_window_monday() {
        let w = week_window(date(2024, 1, 1));
        assert_eq!(w.start, date(2024, 1, 1));
        assert_eq!(w.end, date(2024, 1, 7));
    }

    #[test]
    fn test_week_window_sunday() {
        let w = week_window(date(2024, 1, 14));
        assert_eq!(w.start, date(2024, 1, 8));
    }

    #[test]
    fn test_week_window_crosses_year() {
        // 2025-01-01 is a Wednesday
        let w = week_window(date(2025, 1, 1));
        assert_eq!(w.start, date(2024, 12, 30));
        assert_eq!(w.end, date(2025, 1, 5));
    }

    #[test]
    fn test_week_window_leap_day() {
        // 2024-02-29 is a Thursday
        let w = week_window(date(2024, 2, 29));
        assert_eq!(w.start, date(2024, 2, 26));
        assert_eq!(w.end, date(2024, 3, 3));
    }

    #[test]
    fn test_days_iterates_inclusive() {
        let w = week_window(date(2024, 1, 10));
        let days: Vec<NaiveDate> = w.days().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2024, 1, 8));
        assert_eq!(days[6], date(2024, 1, 14));
    }

    #[test]
    fn test_trailing_window_seven_days() {
        let w = trailing_window(date(2024, 3, 2), 7);
        assert_eq!(w.start, date(2024, 2, 25));
        assert_eq!(w.end, date(2024, 3, 2));
        assert_eq!(w.len_days(), 7);
    }

    #[test]
    fn test_trailing_window_zero_is_today_only() {
        let w = trailing_window(date(2024, 3, 2), 0);
        assert_eq!(w.start, w.end);
    }

    #[test]
    fn test_utc_bounds_half_open() {
        let w = DateWindow::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let (from, to) = w.utc_bounds();
        assert_eq!(from.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-01-03T00:00:00+00:00");
    }

    #[test]
    fn test_new_rejects_inverted() {
        assert!(DateWindow::new(date(2024, 1, 2), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29", "date").unwrap(), date(2024, 2, 29));
        assert!(parse_date("2023-02-29", "date").is_err());
        assert!(parse_date("01/10/2024", "date").is_err());
    }

    #[test]
    fn test_parse_date_rejects_extreme_years() {
        assert!(parse_date("+262142-12-31", "date").is_err());
        assert!(parse_date("-262143-01-01", "date").is_err());
        assert!(parse_date("1899-12-31", "date").is_err());
        assert_eq!(parse_date("1900-01-01", "date").unwrap(), date(1900, 1, 1));
        assert_eq!(parse_date("9999-12-31", "date").unwrap(), date(9999, 12, 31));
    }

    #[test]
    fn test_week_window_at_year_bounds() {
        // 9999-12-31 is a Friday; the week runs into year 10000.
        let w = week_window(date(9999, 12, 31));
        assert_eq!(w.start, date(9999, 12, 27));
        assert_eq!(w.end, date(10000, 1, 2));
        let (_, to) = w.utc_bounds();
        assert_eq!(to.date_naive(), date(10000, 1, 3));

        // 1900-01-01 is a Monday.
        assert_eq!(find_monday(date(1900, 1, 1)), date(1900, 1, 1));
    }

    #[test]
    fn test_new_caps_window_length() {
        assert!(DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).is_ok());
        assert!(DateWindow::new(date(2024, 1, 1), date(2025, 1, 1)).is_err());
        assert!(DateWindow::new(date(1000, 1, 1), date(9999, 12, 31)).is_err());
    }

    #[test]
    fn test_trailing_window_is_capped() {
        let w = trailing_window(date(2024, 3, 2), u32::MAX);
        assert_eq!(w.len_days(), MAX_WINDOW_DAYS);
    }

    #[test]
    fn test_ensure_not_future() {
        let today = date(2024, 5, 10);
        assert!(ensure_not_future(date(2024, 5, 11), today).is_ok());
        assert!(ensure_not_future(date(2024, 5, 12), today).is_err());
        assert!(ensure_not_future(date(2020, 1, 1), today).is_ok());
    }
}
