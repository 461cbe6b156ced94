//! Commission Record Repository
//!
//! Totals are INTEGER minor units; every write is a SQL-side increment so
//! concurrent orders targeting the same (beneficiary, period) never lose updates.

use super::{RepoError, RepoResult, parse_decimal};
use crate::money::from_minor_units;
use rust_decimal::Decimal;
use shared::models::{CommissionRecord, Period, PeriodSummary};
use sqlx::{SqliteConnection, SqlitePool};

const RECORD_SELECT: &str = "SELECT r.id, r.beneficiary_id, r.period_id, p.period_year, p.period_month, r.total_sales, r.order_count, r.commission_rate, r.commission_amount, r.created_at, r.updated_at FROM commission_record r JOIN commission_period p ON p.id = r.period_id";

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: i64,
    beneficiary_id: i64,
    period_id: i64,
    period_year: i32,
    period_month: u32,
    total_sales: i64,
    order_count: i64,
    commission_rate: String,
    commission_amount: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RecordRow> for CommissionRecord {
    type Error = RepoError;

    fn try_from(row: RecordRow) -> RepoResult<Self> {
        let commission_rate = parse_decimal(
            &row.commission_rate,
            "commission_rate",
            format!("record {}", row.id),
        )?;
        let period = Period::new(row.period_year, row.period_month).ok_or_else(|| {
            RepoError::Validation(format!("record {}: invalid period month", row.id))
        })?;
        Ok(CommissionRecord {
            id: row.id,
            beneficiary_id: row.beneficiary_id,
            period_id: row.period_id,
            period,
            total_sales: from_minor_units(row.total_sales),
            order_count: row.order_count,
            commission_rate,
            commission_amount: from_minor_units(row.commission_amount),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CommissionRecord>> {
    let row = sqlx::query_as::<_, RecordRow>(&format!("{RECORD_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(CommissionRecord::try_from).transpose()
}

pub async fn find_by_beneficiary_period(
    pool: &SqlitePool,
    beneficiary_id: i64,
    period: Period,
) -> RepoResult<Option<CommissionRecord>> {
    let row = sqlx::query_as::<_, RecordRow>(&format!(
        "{RECORD_SELECT} WHERE r.beneficiary_id = ? AND p.period_year = ? AND p.period_month = ?"
    ))
    .bind(beneficiary_id)
    .bind(period.year)
    .bind(period.month)
    .fetch_optional(pool)
    .await?;
    row.map(CommissionRecord::try_from).transpose()
}

pub async fn list_by_period(pool: &SqlitePool, period: Period) -> RepoResult<Vec<CommissionRecord>> {
    let rows = sqlx::query_as::<_, RecordRow>(&format!(
        "{RECORD_SELECT} WHERE p.period_year = ? AND p.period_month = ? ORDER BY r.beneficiary_id"
    ))
    .bind(period.year)
    .bind(period.month)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(CommissionRecord::try_from).collect()
}

/// Totals across every record of a period; zeroes when the period has no records
pub async fn period_summary(pool: &SqlitePool, period: Period) -> RepoResult<PeriodSummary> {
    let (total_sales, total_commission, salesperson_count): (i64, i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(r.total_sales), 0), COALESCE(SUM(r.commission_amount), 0), COUNT(r.id) \
         FROM commission_record r JOIN commission_period p ON p.id = r.period_id \
         WHERE p.period_year = ? AND p.period_month = ?",
    )
    .bind(period.year)
    .bind(period.month)
    .fetch_one(pool)
    .await?;

    let total_orders: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT l.order_id) FROM commission_line l \
         JOIN commission_record r ON r.id = l.record_id \
         JOIN commission_period p ON p.id = r.period_id \
         WHERE p.period_year = ? AND p.period_month = ?",
    )
    .bind(period.year)
    .bind(period.month)
    .fetch_one(pool)
    .await?;

    Ok(PeriodSummary {
        period,
        total_sales: from_minor_units(total_sales),
        total_commission: from_minor_units(total_commission),
        total_orders,
        salesperson_count,
    })
}

/// Load-or-create the record and add one order's contribution to it.
///
/// Returns `(record_id, total_sales)` after the increment.
pub async fn add_contribution(
    conn: &mut SqliteConnection,
    beneficiary_id: i64,
    period_id: i64,
    amount_minor: i64,
    rate: Decimal,
) -> RepoResult<(i64, i64)> {
    let now = shared::util::now_millis();
    let row: (i64, i64) = sqlx::query_as(
        "INSERT INTO commission_record (beneficiary_id, period_id, total_sales, order_count, commission_rate, commission_amount, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 1, ?4, 0, ?5, ?5) \
         ON CONFLICT(beneficiary_id, period_id) DO UPDATE SET \
           total_sales = total_sales + excluded.total_sales, \
           order_count = order_count + 1, \
           commission_rate = excluded.commission_rate, \
           updated_at = excluded.updated_at \
         RETURNING id, total_sales",
    )
    .bind(beneficiary_id)
    .bind(period_id)
    .bind(amount_minor)
    .bind(rate.normalize().to_string())
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Increment a known record; `None` when the record no longer exists
pub async fn increment(
    conn: &mut SqliteConnection,
    record_id: i64,
    amount_minor: i64,
    rate: Decimal,
) -> RepoResult<Option<i64>> {
    let total = sqlx::query_scalar::<_, i64>(
        "UPDATE commission_record SET total_sales = total_sales + ?1, order_count = order_count + 1, commission_rate = ?2, updated_at = ?3 WHERE id = ?4 RETURNING total_sales",
    )
    .bind(amount_minor)
    .bind(rate.normalize().to_string())
    .bind(shared::util::now_millis())
    .bind(record_id)
    .fetch_optional(conn)
    .await?;
    Ok(total)
}

pub async fn set_commission_amount(
    conn: &mut SqliteConnection,
    record_id: i64,
    amount_minor: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE commission_record SET commission_amount = ? WHERE id = ?")
        .bind(amount_minor)
        .bind(record_id)
        .execute(conn)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("Commission record {record_id} not found")));
    }
    Ok(())
}
