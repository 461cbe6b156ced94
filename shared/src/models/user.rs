//! Salesperson (beneficiary) model

use serde::{Deserialize, Serialize};

/// User as known to the order-management system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub company_id: Option<i64>,
    pub username: String,
    /// Role key used for per-role commission rates
    pub role: Option<String>,
    pub is_active: bool,
}
