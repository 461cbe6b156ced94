//! Settlement plan
//!
//! Pure composition of proration and attribution for one order. Produces the
//! list of `(beneficiary, amount)` contributions the aggregator persists.

use super::attribution::{self, Attribution};
use super::error::Inconsistency;
use super::period;
use super::proration::{self, ProrationBase};
use super::snapshot::OrderSnapshot;
use crate::money::{DECIMAL_PLACES, checked_sum, round_money, to_minor_units};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::Period;
use std::collections::{BTreeMap, HashSet};

/// One order line's credited share
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub order_line_id: i64,
    pub beneficiary_id: i64,
    pub net_total: Decimal,
    /// Rounded to the minor unit
    pub amount: Decimal,
    pub amount_minor: i64,
    pub upsell: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub period: Period,
    pub base_value: Decimal,
    pub ratio: Decimal,
    pub contributions: Vec<Contribution>,
}

impl SettlementPlan {
    /// Contributions grouped by beneficiary, in ascending beneficiary order
    pub fn by_beneficiary(&self) -> BTreeMap<i64, Vec<&Contribution>> {
        let mut groups: BTreeMap<i64, Vec<&Contribution>> = BTreeMap::new();
        for c in &self.contributions {
            groups.entry(c.beneficiary_id).or_default().push(c);
        }
        groups
    }

    pub fn beneficiary_ids(&self) -> Vec<i64> {
        self.by_beneficiary().into_keys().collect()
    }

    /// Sum of the rounded shares; each share fits in i64 minor units
    pub fn total_attributed(&self) -> Decimal {
        let minor: i128 = self.contributions.iter().map(|c| i128::from(c.amount_minor)).sum();
        Decimal::from_i128_with_scale(minor, DECIMAL_PLACES)
    }
}

/// Every parent reference must point at a line of the same order
fn check_parents(snapshot: &OrderSnapshot) -> Result<(), Inconsistency> {
    let ids: HashSet<i64> = snapshot.lines.iter().map(|l| l.id).collect();
    for line in &snapshot.lines {
        if let Some(parent_id) = line.parent_item_id
            && (parent_id == line.id || !ids.contains(&parent_id))
        {
            return Err(Inconsistency::OrphanParentLine {
                line_id: line.id,
                parent_id,
            });
        }
    }
    Ok(())
}

pub fn build(snapshot: &OrderSnapshot, base: ProrationBase) -> Result<SettlementPlan, Inconsistency> {
    let order = &snapshot.order;
    let confirmed = snapshot
        .payment
        .as_ref()
        .map(|p| p.confirmed_amount)
        .unwrap_or(Decimal::ZERO);
    if confirmed < Decimal::ZERO {
        return Err(Inconsistency::InvalidAmount(format!(
            "order {}: negative confirmed amount {confirmed}",
            order.id
        )));
    }
    check_parents(snapshot)?;

    // Freebies never contribute and never count towards the base
    let mut eligible = Vec::new();
    for line in snapshot.lines.iter().filter(|l| !l.is_freebie) {
        eligible.push((line, attribution::resolve(order, line)?));
    }

    let base_value = checked_sum(
        eligible
            .iter()
            .filter(|(_, a)| match base {
                ProrationBase::EligibleLines => true,
                ProrationBase::AttributedLines => *a != Attribution::PromotionChild,
            })
            .map(|(line, _)| line.net_total),
    )
    .ok_or_else(|| {
        Inconsistency::InvalidAmount(format!("order {}: line totals out of range", order.id))
    })?;
    let ratio = proration::payment_ratio(confirmed, base_value);

    let mut contributions = Vec::new();
    for (line, attr) in eligible {
        let Attribution::Credited {
            beneficiary_id,
            upsell,
        } = attr
        else {
            continue;
        };
        let overflow = || {
            Inconsistency::InvalidAmount(format!(
                "order {} line {}: amount out of range",
                order.id, line.id
            ))
        };
        let raw = proration::commissionable_amount(line.net_total, ratio).ok_or_else(overflow)?;
        let amount_minor = to_minor_units(raw).ok_or_else(overflow)?;
        // Non-positive after rounding contributes nothing
        if amount_minor <= 0 {
            continue;
        }
        contributions.push(Contribution {
            order_line_id: line.id,
            beneficiary_id,
            net_total: line.net_total,
            amount: round_money(raw),
            amount_minor,
            upsell,
        });
    }

    Ok(SettlementPlan {
        order_id: order.id.clone(),
        order_date: order.order_date,
        period: period::resolve(order.order_date),
        base_value,
        ratio,
        contributions,
    })
}
