//! Unified error system for the commission settlement service
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: JSON error body
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::validation("period must be YYYY-MM")
//!     .with_detail("field", "period");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//!
//! let response = ApiResponse::from(&err);
//! assert_eq!(response.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError, AppResult};
