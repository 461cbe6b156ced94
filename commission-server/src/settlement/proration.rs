//! Proration engine
//!
//! Commission scales with what was actually collected:
//! `ratio = confirmed_amount / base_value`, `amount = net_total * ratio`.
//! A non-positive base yields ratio 0 (zero commission, not an error).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which lines form the denominator of the payment ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationBase {
    /// Every non-freebie line
    #[default]
    EligibleLines,
    /// Non-freebie lines that are credited to someone (promotion children left out)
    AttributedLines,
}

impl ProrationBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EligibleLines => "eligible_lines",
            Self::AttributedLines => "attributed_lines",
        }
    }
}

impl fmt::Display for ProrationBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProrationBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eligible_lines" | "eligible" => Ok(Self::EligibleLines),
            "attributed_lines" | "attributed" => Ok(Self::AttributedLines),
            other => Err(format!(
                "unknown proration base '{other}', expected eligible_lines or attributed_lines"
            )),
        }
    }
}

/// `confirmed / base_value`, or zero when the base is not positive
pub fn payment_ratio(confirmed_amount: Decimal, base_value: Decimal) -> Decimal {
    if base_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    confirmed_amount
        .checked_div(base_value)
        .unwrap_or(Decimal::ZERO)
}

/// Unrounded share of a line; `None` on overflow
pub fn commissionable_amount(net_total: Decimal, ratio: Decimal) -> Option<Decimal> {
    net_total.checked_mul(ratio)
}
