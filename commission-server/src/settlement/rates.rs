//! Commission rate book
//!
//! Per-company configuration: a required default rate plus optional
//! per-role overrides. Never hardcoded; a company without a default rate
//! cannot be settled.

use rust_decimal::Decimal;
use shared::models::CommissionRate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RateBook {
    pub company_id: i64,
    pub default_rate: Decimal,
    by_role: HashMap<String, Decimal>,
}

impl RateBook {
    /// `None` when the company has no default (role-less) rate
    pub fn from_rates(company_id: i64, rates: &[CommissionRate]) -> Option<Self> {
        let default_rate = rates
            .iter()
            .find(|r| r.company_id == company_id && r.role.is_none())?
            .rate;
        let by_role = rates
            .iter()
            .filter(|r| r.company_id == company_id)
            .filter_map(|r| r.role.clone().map(|role| (role, r.rate)))
            .collect();
        Some(Self {
            company_id,
            default_rate,
            by_role,
        })
    }

    /// Role-specific rate if configured, else the company default
    pub fn rate_for(&self, role: Option<&str>) -> Decimal {
        role.and_then(|r| self.by_role.get(r))
            .copied()
            .unwrap_or(self.default_rate)
    }
}
