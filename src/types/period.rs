//! Calendar period keys used for grouping

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

/// Calendar month (pandas `to_period('M')`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar quarter (pandas `to_period('Q')`, displayed as `2024Q1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: Season::of_month(date.month()).number(),
        }
    }

    pub fn season(self) -> Season {
        match self.quarter {
            1 => Season::Q1,
            2 => Season::Q2,
            3 => Season::Q3,
            _ => Season::Q4,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Year-independent seasonal bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Season {
    pub fn all() -> &'static [Season] {
        &[Season::Q1, Season::Q2, Season::Q3, Season::Q4]
    }

    /// Bucket for a calendar month (1-12). Out-of-range months clamp to Q4.
    pub fn of_month(month: u32) -> Self {
        match month {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fiscal year labeled by the calendar year it ends in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiscalYear {
    pub end_year: i32,
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY{}", self.end_year)
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_display!(Month, Quarter, Season, FiscalYear);

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_display_and_order() {
        let jan = Month::of(date(2024, 1, 31));
        let dec = Month::of(date(2023, 12, 1));
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!(dec.to_string(), "2023-12");
        assert!(dec < jan);
        assert_eq!(jan.first_day(), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_quarter_display() {
        assert_eq!(Quarter::of(date(2024, 2, 29)).to_string(), "2024Q1");
        assert_eq!(Quarter::of(date(2024, 10, 1)).to_string(), "2024Q4");
        assert_eq!(Quarter::of(date(2024, 10, 1)).season(), Season::Q4);
    }

    #[test]
    fn test_season_of_month_boundaries() {
        assert_eq!(Season::of_month(3), Season::Q1);
        assert_eq!(Season::of_month(4), Season::Q2);
        assert_eq!(Season::of_month(9), Season::Q3);
        assert_eq!(Season::of_month(10), Season::Q4);
    }

    #[test]
    fn test_fiscal_year_display() {
        assert_eq!(FiscalYear { end_year: 2025 }.to_string(), "FY2025");
    }

    #[test]
    fn test_period_serializes_as_label() {
        let json = serde_json::to_string(&Quarter::of(date(2023, 7, 4))).unwrap();
        assert_eq!(json, "\"2023Q3\"");
        let json = serde_json::to_string(&Season::Q2).unwrap();
        assert_eq!(json, "\"Q2\"");
    }
}
