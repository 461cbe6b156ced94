//! Settlement period models

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (year, month) settlement bucket, formatted as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Build a period, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The calendar month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month, rolling December into January
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding calendar month (the month whose orders settle into this one)
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a `YYYY-MM` string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period '{0}', expected YYYY-MM")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Period::new(year, month).ok_or_else(err)
    }
}

/// Persisted settlement period row (created lazily on first use)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SettlementPeriod {
    pub id: i64,
    pub period_year: i32,
    pub period_month: u32,
    pub created_at: i64,
}

impl SettlementPeriod {
    pub fn period(&self) -> Period {
        Period {
            year: self.period_year,
            month: self.period_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_display_and_parse() {
        let p = Period::new(2024, 4).unwrap();
        assert_eq!(p.to_string(), "2024-04");
        assert_eq!("2024-04".parse::<Period>().unwrap(), p);
    }

    #[test]
    fn test_period_parse_rejects_garbage() {
        assert!("2024-13".parse::<Period>().is_err());
        assert!("2024-00".parse::<Period>().is_err());
        assert!("2024-4".parse::<Period>().is_err());
        assert!("24-04".parse::<Period>().is_err());
        assert!("april".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_next_and_previous_roll_over_year() {
        let dec = Period::new(2024, 12).unwrap();
        assert_eq!(dec.next(), Period::new(2025, 1).unwrap());
        assert_eq!(dec.next().previous(), dec);
    }
}
