//! Period resolver
//!
//! Orders settle into the month after their transaction month. The order
//! date is a calendar date already normalized to the business day.

use chrono::NaiveDate;
use shared::models::Period;

pub fn resolve(order_date: NaiveDate) -> Period {
    Period::containing(order_date).next()
}

/// Last order date that settles into `period` (the day before it starts)
pub fn last_order_date(period: Period) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(period.year, period.month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_any_day_of_march_settles_in_april() {
        for day in [1, 15, 31] {
            assert_eq!(resolve(date(2024, 3, day)), Period::new(2024, 4).unwrap());
        }
    }

    #[test]
    fn test_december_rolls_over() {
        assert_eq!(resolve(date(2023, 12, 31)), Period::new(2024, 1).unwrap());
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(resolve(date(2024, 2, 29)), Period::new(2024, 3).unwrap());
    }

    #[test]
    fn test_last_order_date() {
        let april = Period::new(2024, 4).unwrap();
        assert_eq!(last_order_date(april), Some(date(2024, 3, 31)));
        let january = Period::new(2025, 1).unwrap();
        assert_eq!(last_order_date(january), Some(date(2024, 12, 31)));
        assert_eq!(resolve(last_order_date(april).unwrap()), april);
    }
}
