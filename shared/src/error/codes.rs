//! Error codes for the commission settlement service
//!
//! - 0xxx: General errors
//! - 4xxx: Order snapshot errors
//! - 5xxx: Commission errors
//! - 9xxx: System errors

use serde::Serialize;
use std::fmt;

/// Numeric error code carried in every error response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    /// Order line references a parent that is not part of the order
    OrderLineOrphaned = 4002,
    /// Monetary value on the order snapshot is unreadable or out of range
    OrderInvalidAmount = 4003,

    // ==================== 5xxx: Commission ====================
    CommissionRecordNotFound = 5001,
    /// Period is not `YYYY-MM`
    SettlementPeriodInvalid = 5002,
    CommissionRateNotConfigured = 5003,
    /// Rate outside `0..=1`
    CommissionRateInvalid = 5004,
    /// Beneficiary is not a known user, or belongs to no company
    BeneficiaryUnknown = 5005,

    // ==================== 9xxx: System ====================
    DatabaseError = 9002,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}
