//! Settlement error types
//!
//! Three families, handled differently by the batch:
//! - `Rejected`: expected input rejection, the order is terminal
//! - `Inconsistent`: upstream data problem, the order stays pending
//! - `Storage`: transaction failure, retried as-is on the next run
//!
//! `RateNotConfigured` is a configuration failure and aborts a whole company.

use crate::db::repository::RepoError;
use shared::models::RejectionReason;
use thiserror::Error;

/// Upstream data that cannot be settled until it is fixed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: String },

    #[error("line {line_id} references missing parent line {parent_id}")]
    OrphanParentLine { line_id: i64, parent_id: i64 },

    #[error("line {line_id} has no creator and the order has no creator")]
    NoBeneficiary { line_id: i64 },

    #[error("beneficiary {user_id} is not a known user")]
    UnknownBeneficiary { user_id: i64 },

    #[error("beneficiary {user_id} belongs to no company")]
    BeneficiaryWithoutCompany { user_id: i64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl Inconsistency {
    /// Stable machine-readable code reported in the batch summary
    pub fn code(&self) -> &'static str {
        match self {
            Self::OrderNotFound { .. } => "ORDER_NOT_FOUND",
            Self::OrphanParentLine { .. } => "ORPHAN_PARENT_LINE",
            Self::NoBeneficiary { .. } => "NO_BENEFICIARY",
            Self::UnknownBeneficiary { .. } => "UNKNOWN_BENEFICIARY",
            Self::BeneficiaryWithoutCompany { .. } => "BENEFICIARY_WITHOUT_COMPANY",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
        }
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("order rejected: {0}")]
    Rejected(RejectionReason),

    #[error(transparent)]
    Inconsistent(#[from] Inconsistency),

    #[error("no commission rate configured for company {company_id}")]
    RateNotConfigured { company_id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] RepoError),
}

impl From<sqlx::Error> for SettlementError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.into())
    }
}

impl SettlementError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected(reason) => reason.as_str(),
            Self::Inconsistent(inc) => inc.code(),
            Self::RateNotConfigured { .. } => "RATE_NOT_CONFIGURED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether re-running the same order unchanged may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            SettlementError::Rejected(RejectionReason::NoLines).code(),
            "NO_LINES"
        );
        assert_eq!(
            SettlementError::from(Inconsistency::OrphanParentLine {
                line_id: 2,
                parent_id: 99
            })
            .code(),
            "ORPHAN_PARENT_LINE"
        );
        assert_eq!(
            SettlementError::RateNotConfigured { company_id: 1 }.code(),
            "RATE_NOT_CONFIGURED"
        );
    }

    #[test]
    fn test_only_storage_is_retryable() {
        assert!(SettlementError::Storage(RepoError::Database("locked".into())).is_retryable());
        assert!(!SettlementError::from(Inconsistency::UnknownBeneficiary { user_id: 7 }).is_retryable());
        assert!(!SettlementError::Rejected(RejectionReason::AlreadySettled).is_retryable());
    }
}
