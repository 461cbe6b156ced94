//! Order snapshot models (read-only view of the order-management system)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment confirmation action that makes an order eligible for settlement
pub const CONFIRMED_ACTION: &str = "Confirmed";

/// Order header as seen by the settlement engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Transaction date, already normalized to the business calendar day
    pub order_date: NaiveDate,
    pub total_amount: Decimal,
    /// Originating salesperson
    pub creator_id: Option<i64>,
    pub company_id: Option<i64>,
    /// Lifecycle status, owned by the order-management system
    pub status: String,
}

/// A single order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub net_total: Decimal,
    /// Salesperson who attached this line; differs from the order creator for upsells
    pub creator_id: Option<i64>,
    pub is_freebie: bool,
    /// Parent line within the same order (bundled / promotional child)
    pub parent_item_id: Option<i64>,
}

impl OrderLine {
    /// Whether this line is bundled under another line
    pub fn is_child(&self) -> bool {
        self.parent_item_id.is_some()
    }
}

/// Confirmed payment produced by the external reconciliation process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub confirmed_amount: Decimal,
    pub confirmed_action: String,
    /// Confirmation time (Unix millis)
    pub confirmed_at: i64,
}

impl PaymentConfirmation {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_action == CONFIRMED_ACTION
    }
}
