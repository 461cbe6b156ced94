//! Commission record, audit line and rate models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// Per-(beneficiary, period) accumulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: i64,
    pub beneficiary_id: i64,
    pub period_id: i64,
    pub period: Period,
    /// Sum of attributed (prorated, rounded) sales
    pub total_sales: Decimal,
    /// Distinct orders that contributed
    pub order_count: i64,
    /// Rate applied at the last update
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Audit line: one per contributing order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLine {
    pub id: i64,
    pub record_id: i64,
    pub order_id: String,
    pub order_line_id: i64,
    pub order_date: chrono::NaiveDate,
    /// Line net total before proration
    pub net_total: Decimal,
    /// Payment ratio applied to the line
    pub payment_ratio: Decimal,
    /// Amount attributed to the record's beneficiary
    pub amount: Decimal,
    pub created_at: i64,
}

/// Configured commission rate for a company, optionally narrowed to a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub company_id: i64,
    /// `None` is the company default
    pub role: Option<String>,
    /// Fraction, e.g. `0.05` for 5%
    pub rate: Decimal,
    pub updated_at: i64,
}

/// Set/replace a commission rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRateUpsert {
    #[serde(default)]
    pub role: Option<String>,
    pub rate: Decimal,
}

/// Aggregated view of one settlement period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub total_sales: Decimal,
    pub total_commission: Decimal,
    /// Distinct orders settled into the period
    pub total_orders: i64,
    pub salesperson_count: i64,
}
