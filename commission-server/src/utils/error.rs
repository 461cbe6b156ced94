//! 统一错误处理
//!
//! Re-exports the shared error system and maps the server's layer errors
//! onto it:
//!
//! | Source            | ErrorCode                          |
//! |-------------------|------------------------------------|
//! | `RepoError`       | NotFound / AlreadyExists / Database / ValidationFailed |
//! | `Inconsistency`   | OrderNotFound / OrderLineOrphaned / BeneficiaryUnknown / OrderInvalidAmount |
//! | `RateNotConfigured` | CommissionRateNotConfigured      |

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;
use crate::settlement::{Inconsistency, SettlementError};

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::already_exists(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        let code = err.code();
        match err {
            SettlementError::Storage(repo) => repo.into(),
            SettlementError::RateNotConfigured { company_id } => AppError::with_message(
                ErrorCode::CommissionRateNotConfigured,
                format!("No commission rate configured for company {company_id}"),
            )
            .with_detail("company_id", company_id),
            SettlementError::Rejected(reason) => {
                AppError::validation(format!("Order rejected: {reason}"))
                    .with_detail("reason", code)
            }
            SettlementError::Inconsistent(inc) => {
                let error_code = match &inc {
                    Inconsistency::OrderNotFound { .. } => ErrorCode::OrderNotFound,
                    Inconsistency::OrphanParentLine { .. } => ErrorCode::OrderLineOrphaned,
                    Inconsistency::NoBeneficiary { .. }
                    | Inconsistency::UnknownBeneficiary { .. }
                    | Inconsistency::BeneficiaryWithoutCompany { .. } => ErrorCode::BeneficiaryUnknown,
                    Inconsistency::InvalidAmount(_) => ErrorCode::OrderInvalidAmount,
                };
                AppError::with_message(error_code, inc.to_string()).with_detail("code", code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use shared::models::RejectionReason;

    #[test]
    fn test_repo_error_mapping() {
        let err: AppError = RepoError::Duplicate("line".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        let err: AppError = RepoError::Database("locked".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_settlement_error_mapping() {
        let err: AppError = SettlementError::RateNotConfigured { company_id: 3 }.into();
        assert_eq!(err.code, ErrorCode::CommissionRateNotConfigured);
        assert_eq!(err.http_status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: AppError = SettlementError::from(Inconsistency::OrphanParentLine {
            line_id: 2,
            parent_id: 9,
        })
        .into();
        assert_eq!(err.code, ErrorCode::OrderLineOrphaned);

        let err: AppError = SettlementError::Rejected(RejectionReason::NotConfirmed).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
