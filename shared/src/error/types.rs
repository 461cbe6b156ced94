//! Error type and the JSON body it renders to

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error: a code, a message, and optional structured context
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Context such as the offending field or company id
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{r} not found")).with_detail("resource", r)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::AlreadyExists, format!("{r} already exists"))
            .with_detail("resource", r)
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ApiResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (status, axum::Json(ApiResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Invalid period")
            .with_detail("field", "period")
            .with_detail("value", "2024-13");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "period");
        assert_eq!(details.get("value").unwrap(), "2024-13");
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::not_found("Commission record").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::database("locked").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_body() {
        let err = AppError::with_message(ErrorCode::CommissionRateInvalid, "rate 1.5")
            .with_detail("company_id", 1);
        let body = serde_json::to_value(ApiResponse::from(&err)).unwrap();
        assert_eq!(body["code"], 5004);
        assert_eq!(body["message"], "rate 1.5");
        assert_eq!(body["details"]["company_id"], 1);
    }
}
