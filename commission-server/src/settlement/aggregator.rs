//! Settlement aggregator
//!
//! Folds one order's plan into per-(beneficiary, period) records and writes
//! one audit line per contribution. Runs on the order's transaction
//! connection; the caller commits or rolls back.

use super::cache::SettlementCache;
use super::error::{Inconsistency, SettlementResult};
use super::plan::SettlementPlan;
use crate::db::repository::line::{self, NewCommissionLine};
use crate::db::repository::{period, record};
use crate::money::commission_minor_units;
use rust_decimal::Decimal;
use shared::models::Period;
use sqlx::SqliteConnection;
use std::collections::HashMap;

/// What one order wrote, used to warm the cache after commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOrder {
    pub period: Period,
    pub period_id: i64,
    /// (beneficiary_id, record_id)
    pub records: Vec<(i64, i64)>,
    pub lines_written: usize,
}

/// Persist `plan`; `rates` maps every beneficiary in the plan to its rate
pub async fn apply(
    conn: &mut SqliteConnection,
    plan: &SettlementPlan,
    rates: &HashMap<i64, Decimal>,
    cache: &SettlementCache,
) -> SettlementResult<AppliedOrder> {
    let period_id = match cache.period_id(plan.period) {
        Some(id) => id,
        None => period::ensure(&mut *conn, plan.period).await?,
    };

    let mut records = Vec::new();
    let mut lines_written = 0;

    for (beneficiary_id, contributions) in plan.by_beneficiary() {
        let rate = rates
            .get(&beneficiary_id)
            .copied()
            .ok_or(Inconsistency::UnknownBeneficiary {
                user_id: beneficiary_id,
            })?;
        let amount_minor = contributions
            .iter()
            .try_fold(0i64, |acc, c| acc.checked_add(c.amount_minor))
            .ok_or_else(|| {
                Inconsistency::InvalidAmount(format!(
                    "order {}: share of beneficiary {beneficiary_id} out of range",
                    plan.order_id
                ))
            })?;

        // order_count moves by exactly one per (order, beneficiary)
        let cached = match cache.record_id(beneficiary_id, period_id) {
            Some(record_id) => record::increment(&mut *conn, record_id, amount_minor, rate)
                .await?
                .map(|total| (record_id, total)),
            None => None,
        };
        let (record_id, total_sales) = match cached {
            Some(hit) => hit,
            None => {
                cache.forget_record(beneficiary_id, period_id);
                record::add_contribution(&mut *conn, beneficiary_id, period_id, amount_minor, rate)
                    .await?
            }
        };

        let commission = commission_minor_units(total_sales, rate).ok_or_else(|| {
            Inconsistency::InvalidAmount(format!(
                "commission for beneficiary {beneficiary_id} out of range"
            ))
        })?;
        record::set_commission_amount(&mut *conn, record_id, commission).await?;

        for c in contributions {
            line::insert(
                &mut *conn,
                NewCommissionLine {
                    record_id,
                    order_id: &plan.order_id,
                    order_line_id: c.order_line_id,
                    order_date: plan.order_date,
                    net_total: c.net_total,
                    payment_ratio: plan.ratio,
                    amount_minor: c.amount_minor,
                },
            )
            .await?;
            lines_written += 1;
        }

        tracing::debug!(
            order_id = %plan.order_id,
            beneficiary_id,
            record_id,
            amount_minor,
            total_sales,
            "Commission record updated"
        );
        records.push((beneficiary_id, record_id));
    }

    Ok(AppliedOrder {
        period: plan.period,
        period_id,
        records,
        lines_written,
    })
}
