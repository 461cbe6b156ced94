//! Order & line snapshot reader

use super::error::{Inconsistency, SettlementResult};
use crate::db::repository::order;
use shared::models::{Order, OrderLine, PaymentConfirmation};
use sqlx::SqliteConnection;

/// Everything the engine reads about one order
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub payment: Option<PaymentConfirmation>,
}

impl OrderSnapshot {
    pub fn find_line(&self, line_id: i64) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }
}

pub async fn load(conn: &mut SqliteConnection, order_id: &str) -> SettlementResult<OrderSnapshot> {
    let order = order::find_order(&mut *conn, order_id)
        .await?
        .ok_or_else(|| Inconsistency::OrderNotFound {
            order_id: order_id.to_string(),
        })?;
    let lines = order::find_lines(&mut *conn, order_id).await?;
    let payment = order::find_payment(&mut *conn, order_id).await?;
    Ok(OrderSnapshot {
        order,
        lines,
        payment,
    })
}
