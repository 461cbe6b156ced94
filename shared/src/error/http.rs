//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::CommissionRecordNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::AlreadyExists => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::OrderLineOrphaned
            | Self::OrderInvalidAmount
            | Self::BeneficiaryUnknown
            | Self::CommissionRateNotConfigured => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::SettlementPeriodInvalid
            | Self::CommissionRateInvalid => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::AlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::CommissionRecordNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::SettlementPeriodInvalid.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::CommissionRateNotConfigured.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
