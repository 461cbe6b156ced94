//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts stay as `Decimal` through proration and attribution. Rounding to
//! the currency's minor unit (2 decimal places, half-up) happens only when a
//! value is persisted, where it is stored as integer minor units.

use rust_decimal::prelude::*;

/// Currency minor unit (cents)
pub const DECIMAL_PLACES: u32 = 2;

/// Minor units per major unit
const MINOR_PER_MAJOR: i64 = 100;

/// Round to the minor unit, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round and convert to integer minor units; `None` on overflow
pub fn to_minor_units(value: Decimal) -> Option<i64> {
    round_money(value)
        .checked_mul(Decimal::from(MINOR_PER_MAJOR))?
        .to_i64()
}

#[inline]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, DECIMAL_PLACES)
}

/// Parse a decimal string as stored upstream (`"1234.50"`, `" 12 "`)
pub fn parse_amount(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim()).ok()
}

/// Checked sum; `None` when the total leaves `Decimal` range
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Commission owed on `total_sales` at `rate`, rounded to the minor unit
pub fn commission_minor_units(total_sales_minor: i64, rate: Decimal) -> Option<i64> {
    to_minor_units(from_minor_units(total_sales_minor).checked_mul(rate)?)
}
