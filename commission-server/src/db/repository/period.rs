//! Settlement Period Repository

use super::{RepoError, RepoResult};
use shared::models::{Period, SettlementPeriod};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find(pool: &SqlitePool, period: Period) -> RepoResult<Option<SettlementPeriod>> {
    let row = sqlx::query_as::<_, SettlementPeriod>(
        "SELECT id, period_year, period_month, created_at FROM commission_period WHERE period_year = ? AND period_month = ?",
    )
    .bind(period.year)
    .bind(period.month)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Id of the period row, creating it on first use
pub async fn ensure(conn: &mut SqliteConnection, period: Period) -> RepoResult<i64> {
    sqlx::query(
        "INSERT INTO commission_period (period_year, period_month, created_at) VALUES (?1, ?2, ?3) ON CONFLICT(period_year, period_month) DO NOTHING",
    )
    .bind(period.year)
    .bind(period.month)
    .bind(shared::util::now_millis())
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM commission_period WHERE period_year = ? AND period_month = ?",
    )
    .bind(period.year)
    .bind(period.month)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepoError::Database(format!("Failed to create period {period}")))
}
