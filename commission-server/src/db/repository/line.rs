//! Commission Line Repository (audit trail)

use super::{RepoError, RepoResult, parse_decimal};
use crate::money::from_minor_units;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::CommissionLine;
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: i64,
    record_id: i64,
    order_id: String,
    order_line_id: i64,
    order_date: NaiveDate,
    net_total: String,
    payment_ratio: String,
    amount: i64,
    created_at: i64,
}

impl TryFrom<LineRow> for CommissionLine {
    type Error = RepoError;

    fn try_from(row: LineRow) -> RepoResult<Self> {
        let owner = format!("line {}", row.id);
        let net_total = parse_decimal(&row.net_total, "net_total", &owner)?;
        let payment_ratio = parse_decimal(&row.payment_ratio, "payment_ratio", &owner)?;
        Ok(CommissionLine {
            id: row.id,
            record_id: row.record_id,
            order_id: row.order_id,
            order_line_id: row.order_line_id,
            order_date: row.order_date,
            net_total,
            payment_ratio,
            amount: from_minor_units(row.amount),
            created_at: row.created_at,
        })
    }
}

/// New audit line, written inside the order's transaction
#[derive(Debug, Clone)]
pub struct NewCommissionLine<'a> {
    pub record_id: i64,
    pub order_id: &'a str,
    pub order_line_id: i64,
    pub order_date: NaiveDate,
    pub net_total: Decimal,
    pub payment_ratio: Decimal,
    pub amount_minor: i64,
}

/// Idempotency guard: whether the order already left a line or an empty-settlement mark
pub async fn exists_for_order(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM commission_line WHERE order_id = ?1) \
             OR EXISTS(SELECT 1 FROM commission_empty_settlement WHERE order_id = ?1)",
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(exists != 0)
}

pub async fn insert(conn: &mut SqliteConnection, line: NewCommissionLine<'_>) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO commission_line (record_id, order_id, order_line_id, order_date, net_total, payment_ratio, amount, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
    )
    .bind(line.record_id)
    .bind(line.order_id)
    .bind(line.order_line_id)
    .bind(line.order_date)
    .bind(line.net_total.normalize().to_string())
    .bind(line.payment_ratio.normalize().to_string())
    .bind(line.amount_minor)
    .bind(shared::util::now_millis())
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Settle an order that has nothing to attribute; a second mark is a `Duplicate`
pub async fn mark_empty(
    conn: &mut SqliteConnection,
    order_id: &str,
    order_date: NaiveDate,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO commission_empty_settlement (order_id, order_date, settled_at) VALUES (?1, ?2, ?3)",
    )
    .bind(order_id)
    .bind(order_date)
    .bind(shared::util::now_millis())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_by_record(pool: &SqlitePool, record_id: i64) -> RepoResult<Vec<CommissionLine>> {
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT id, record_id, order_id, order_line_id, order_date, net_total, payment_ratio, amount, created_at FROM commission_line WHERE record_id = ? ORDER BY id",
    )
    .bind(record_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(CommissionLine::try_from).collect()
}
