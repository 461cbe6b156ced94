//! Error category classification

use super::codes::ErrorCode;

/// Error category, derived from the code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 0xxx
    General,
    /// 4xxx
    Order,
    /// 5xxx
    Commission,
    /// 9xxx and anything unassigned
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            5000..6000 => Self::Commission,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
