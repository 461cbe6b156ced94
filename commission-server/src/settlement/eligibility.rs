//! Eligibility filter
//!
//! Rejection reasons are checked in a fixed order; the first match wins:
//! `NOT_CONFIRMED` → `ALREADY_SETTLED` → `MISSING_COMPANY` → `NO_LINES`.

use super::error::SettlementResult;
use super::snapshot::{self, OrderSnapshot};
use crate::db::repository::line;
use shared::models::RejectionReason;
use sqlx::SqliteConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(RejectionReason),
}

/// Pure evaluation over a loaded snapshot
pub fn evaluate(snapshot: &OrderSnapshot, already_settled: bool) -> Eligibility {
    let confirmed = snapshot.payment.as_ref().is_some_and(|p| p.is_confirmed());
    if !confirmed {
        return Eligibility::Rejected(RejectionReason::NotConfirmed);
    }
    if already_settled {
        return Eligibility::Rejected(RejectionReason::AlreadySettled);
    }
    if snapshot.order.company_id.is_none() {
        return Eligibility::Rejected(RejectionReason::MissingCompany);
    }
    if snapshot.lines.is_empty() {
        return Eligibility::Rejected(RejectionReason::NoLines);
    }
    Eligibility::Eligible
}

/// Load the order and evaluate it; no side effects
pub async fn check(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> SettlementResult<(OrderSnapshot, Eligibility)> {
    let snapshot = snapshot::load(&mut *conn, order_id).await?;
    let already_settled = line::exists_for_order(&mut *conn, order_id).await?;
    let eligibility = evaluate(&snapshot, already_settled);
    Ok((snapshot, eligibility))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::{CONFIRMED_ACTION, Order, OrderLine, PaymentConfirmation};

    fn snapshot(action: Option<&str>, company: Option<i64>, lines: usize) -> OrderSnapshot {
        OrderSnapshot {
            order: Order {
                id: "O1".into(),
                order_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                total_amount: Decimal::from(100),
                creator_id: Some(1),
                company_id: company,
                status: "Completed".into(),
            },
            lines: (0..lines)
                .map(|i| OrderLine {
                    id: i as i64 + 1,
                    order_id: "O1".into(),
                    product_name: None,
                    quantity: 1,
                    net_total: Decimal::from(100),
                    creator_id: None,
                    is_freebie: false,
                    parent_item_id: None,
                })
                .collect(),
            payment: action.map(|a| PaymentConfirmation {
                order_id: "O1".into(),
                confirmed_amount: Decimal::from(100),
                confirmed_action: a.into(),
                confirmed_at: 0,
            }),
        }
    }

    #[test]
    fn test_eligible() {
        let s = snapshot(Some(CONFIRMED_ACTION), Some(1), 1);
        assert_eq!(evaluate(&s, false), Eligibility::Eligible);
    }

    #[test]
    fn test_missing_or_unconfirmed_payment() {
        let s = snapshot(None, Some(1), 1);
        assert_eq!(
            evaluate(&s, false),
            Eligibility::Rejected(RejectionReason::NotConfirmed)
        );
        let s = snapshot(Some("Pending"), Some(1), 1);
        assert_eq!(
            evaluate(&s, false),
            Eligibility::Rejected(RejectionReason::NotConfirmed)
        );
    }

    #[test]
    fn test_first_match_wins() {
        // unconfirmed beats everything else
        let s = snapshot(None, None, 0);
        assert_eq!(
            evaluate(&s, true),
            Eligibility::Rejected(RejectionReason::NotConfirmed)
        );
        // already settled beats missing company and no lines
        let s = snapshot(Some(CONFIRMED_ACTION), None, 0);
        assert_eq!(
            evaluate(&s, true),
            Eligibility::Rejected(RejectionReason::AlreadySettled)
        );
        // missing company beats no lines
        assert_eq!(
            evaluate(&s, false),
            Eligibility::Rejected(RejectionReason::MissingCompany)
        );
        let s = snapshot(Some(CONFIRMED_ACTION), Some(1), 0);
        assert_eq!(
            evaluate(&s, false),
            Eligibility::Rejected(RejectionReason::NoLines)
        );
    }
}
