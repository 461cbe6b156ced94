//! Batch settlement request / summary types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// Why an order is not a settlement candidate
///
/// Evaluated in declaration order; first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    NotConfirmed,
    AlreadySettled,
    MissingCompany,
    NoLines,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfirmed => "NOT_CONFIRMED",
            Self::AlreadySettled => "ALREADY_SETTLED",
            Self::MissingCompany => "MISSING_COMPANY",
            Self::NoLines => "NO_LINES",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-order lifecycle inside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSettlementState {
    Pending,
    Eligible,
    Settled,
    Rejected,
}

/// Batch trigger: explicit ids, or everything eligible up to a date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettleRequest {
    Orders {
        order_ids: Vec<String>,
    },
    Until {
        until: NaiveDate,
        #[serde(default)]
        company_id: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledOrder {
    pub order_id: String,
    pub period: Period,
    pub payment_ratio: Decimal,
    /// Number of commission lines written
    pub lines: usize,
    pub beneficiaries: usize,
    pub total_attributed: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedOrder {
    pub order_id: String,
    pub reason: RejectionReason,
}

/// Order left pending because of a data or storage problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOrder {
    pub order_id: String,
    pub code: String,
    pub message: String,
    /// Storage failures are retryable as-is; data inconsistencies need upstream fixes
    pub retryable: bool,
}

/// Company skipped because of a configuration failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedCompany {
    pub company_id: i64,
    pub code: String,
    pub message: String,
    pub order_ids: Vec<String>,
}

/// Structured result of one `settle` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub settled: Vec<SettledOrder>,
    pub rejected: Vec<RejectedOrder>,
    pub failed: Vec<FailedOrder>,
    pub aborted: Vec<AbortedCompany>,
}

impl SettlementSummary {
    /// Number of orders the batch looked at
    pub fn total(&self) -> usize {
        self.settled.len()
            + self.rejected.len()
            + self.failed.len()
            + self.aborted.iter().map(|a| a.order_ids.len()).sum::<usize>()
    }

    /// Total commission lines written by the batch
    pub fn lines_written(&self) -> usize {
        self.settled.iter().map(|s| s.lines).sum()
    }
}
