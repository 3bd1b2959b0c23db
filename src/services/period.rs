//! Date → period bucketing

use chrono::{Datelike, NaiveDate};

use crate::types::{FiscalYear, Month, Quarter, Season};

/// Seasonal bucket of a date (calendar quarter, year-independent).
/// Total over all dates; the four buckets are disjoint.
pub fn seasonal_bucket(date: NaiveDate) -> Season {
    Season::of_month(date.month())
}

pub fn month_of(date: NaiveDate) -> Month {
    Month::of(date)
}

pub fn quarter_of(date: NaiveDate) -> Quarter {
    Quarter::of(date)
}

/// Fiscal year containing `date` for a fiscal year starting in `start_month`.
///
/// Labeled by the calendar year in which the fiscal year ends:
/// with `start_month = 4`, 2024-03-31 is FY2024 and 2024-04-01 is FY2025.
/// `start_month = 1` (or anything outside 2-12) yields the calendar year.
pub fn fiscal_year_of(date: NaiveDate, start_month: u32) -> FiscalYear {
    let end_year = if (2..=12).contains(&start_month) && date.month() >= start_month {
        date.year() + 1
    } else {
        date.year()
    };
    FiscalYear { end_year }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========== seasonal_bucket tests ==========

    #[test]
    fn test_seasonal_bucket_is_total_and_partitions_year() {
        // Walk every day of a leap year: each date lands in exactly one bucket
        let mut counts = [0u32; 4];
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            let bucket = seasonal_bucket(day);
            counts[(bucket.number() - 1) as usize] += 1;
            day = day.succ_opt().unwrap();
        }
        assert_eq!(counts, [91, 91, 92, 92]);
        assert_eq!(counts.iter().sum::<u32>(), 366);
    }

    #[test]
    fn test_seasonal_bucket_boundaries() {
        assert_eq!(seasonal_bucket(date(2023, 3, 31)), Season::Q1);
        assert_eq!(seasonal_bucket(date(2023, 4, 1)), Season::Q2);
        assert_eq!(seasonal_bucket(date(2023, 6, 30)), Season::Q2);
        assert_eq!(seasonal_bucket(date(2023, 7, 1)), Season::Q3);
        assert_eq!(seasonal_bucket(date(2023, 12, 31)), Season::Q4);
    }

    #[test]
    fn test_seasonal_bucket_ignores_year() {
        assert_eq!(
            seasonal_bucket(date(1999, 11, 2)),
            seasonal_bucket(date(2031, 11, 2))
        );
    }

    // ========== fiscal_year_of tests ==========

    #[test]
    fn test_fiscal_year_calendar() {
        assert_eq!(fiscal_year_of(date(2024, 1, 1), 1).end_year, 2024);
        assert_eq!(fiscal_year_of(date(2024, 12, 31), 1).end_year, 2024);
    }

    #[test]
    fn test_fiscal_year_april_start() {
        assert_eq!(fiscal_year_of(date(2024, 3, 31), 4).end_year, 2024);
        assert_eq!(fiscal_year_of(date(2024, 4, 1), 4).end_year, 2025);
    }

    #[test]
    fn test_fiscal_year_invalid_start_month_is_calendar() {
        assert_eq!(fiscal_year_of(date(2024, 6, 1), 0).end_year, 2024);
        assert_eq!(fiscal_year_of(date(2024, 6, 1), 13).end_year, 2024);
    }

    #[test]
    fn test_month_and_quarter_of() {
        assert_eq!(month_of(date(2022, 8, 15)).to_string(), "2022-08");
        assert_eq!(quarter_of(date(2022, 8, 15)).to_string(), "2022Q3");
    }
}
