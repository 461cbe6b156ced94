//! Order Snapshot Repository
//!
//! Read-only access to the order-management tables. Money columns are
//! decimal TEXT upstream and are parsed into `Decimal` here.

use super::{RepoError, RepoResult, parse_decimal};
use chrono::NaiveDate;
use shared::models::{CONFIRMED_ACTION, Order, OrderLine, PaymentConfirmation};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

/// SQLite bind parameter limit is 999 on older builds
const ID_CHUNK: usize = 500;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_date: NaiveDate,
    total_amount: String,
    creator_id: Option<i64>,
    company_id: Option<i64>,
    order_status: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> RepoResult<Self> {
        let total_amount = parse_decimal(&row.total_amount, "total_amount", &row.id)?;
        Ok(Order {
            id: row.id,
            order_date: row.order_date,
            total_amount,
            creator_id: row.creator_id,
            company_id: row.company_id,
            status: row.order_status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i64,
    parent_order_id: String,
    product_name: Option<String>,
    quantity: i32,
    net_total: String,
    creator_id: Option<i64>,
    is_freebie: bool,
    parent_item_id: Option<i64>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepoError;

    fn try_from(row: OrderLineRow) -> RepoResult<Self> {
        let owner = format!("{}#{}", row.parent_order_id, row.id);
        let net_total = parse_decimal(&row.net_total, "net_total", owner)?;
        Ok(OrderLine {
            id: row.id,
            order_id: row.parent_order_id,
            product_name: row.product_name,
            quantity: row.quantity,
            net_total,
            creator_id: row.creator_id,
            is_freebie: row.is_freebie,
            parent_item_id: row.parent_item_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    order_id: String,
    confirmed_amount: String,
    confirmed_action: String,
    confirmed_at: i64,
}

impl TryFrom<PaymentRow> for PaymentConfirmation {
    type Error = RepoError;

    fn try_from(row: PaymentRow) -> RepoResult<Self> {
        let confirmed_amount =
            parse_decimal(&row.confirmed_amount, "confirmed_amount", &row.order_id)?;
        Ok(PaymentConfirmation {
            order_id: row.order_id,
            confirmed_amount,
            confirmed_action: row.confirmed_action,
            confirmed_at: row.confirmed_at,
        })
    }
}

pub async fn find_order(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_date, total_amount, creator_id, company_id, order_status FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    row.map(Order::try_from).transpose()
}

pub async fn find_lines(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<Vec<OrderLine>> {
    let rows = sqlx::query_as::<_, OrderLineRow>(
        "SELECT id, parent_order_id, product_name, quantity, net_total, creator_id, is_freebie, parent_item_id FROM order_items WHERE parent_order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(OrderLine::try_from).collect()
}

pub async fn find_payment(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> RepoResult<Option<PaymentConfirmation>> {
    let row = sqlx::query_as::<_, PaymentRow>(
        "SELECT order_id, confirmed_amount, confirmed_action, confirmed_at FROM payment_confirmation WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    row.map(PaymentConfirmation::try_from).transpose()
}

/// Company of each known order (orders without a company are omitted)
pub async fn find_company_ids(
    pool: &SqlitePool,
    order_ids: &[String],
) -> RepoResult<Vec<(String, i64)>> {
    let mut out = Vec::with_capacity(order_ids.len());
    for chunk in order_ids.chunks(ID_CHUNK) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, company_id FROM orders WHERE company_id IS NOT NULL AND id IN (");
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(id);
        }
        sep.push_unseparated(")");
        let rows: Vec<(String, i64)> = qb.build_query_as().fetch_all(pool).await?;
        out.extend(rows);
    }
    Ok(out)
}

/// Orders with a confirmed payment, dated on or before `until`, and not yet settled
pub async fn find_candidates(
    pool: &SqlitePool,
    until: NaiveDate,
    company_id: Option<i64>,
) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT o.id FROM orders o \
         JOIN payment_confirmation p ON p.order_id = o.id AND p.confirmed_action = ?1 \
         WHERE o.order_date <= ?2 \
           AND (?3 IS NULL OR o.company_id = ?3) \
           AND NOT EXISTS (SELECT 1 FROM commission_line l WHERE l.order_id = o.id) \
           AND NOT EXISTS (SELECT 1 FROM commission_empty_settlement e WHERE e.order_id = o.id) \
         ORDER BY o.order_date, o.id",
    )
    .bind(CONFIRMED_ACTION)
    .bind(until)
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
