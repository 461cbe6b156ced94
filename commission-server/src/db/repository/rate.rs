//! Commission Rate Repository

use super::{RepoError, RepoResult, parse_decimal};
use rust_decimal::Decimal;
use shared::models::{CommissionRate, CommissionRateUpsert};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    company_id: i64,
    role: Option<String>,
    rate: String,
    updated_at: i64,
}

impl TryFrom<RateRow> for CommissionRate {
    type Error = RepoError;

    fn try_from(row: RateRow) -> RepoResult<Self> {
        let rate = parse_decimal(&row.rate, "rate", format!("company {}", row.company_id))?;
        Ok(CommissionRate {
            company_id: row.company_id,
            role: row.role,
            rate,
            updated_at: row.updated_at,
        })
    }
}

fn validate_rate(rate: Decimal) -> RepoResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RepoError::Validation(format!(
            "Commission rate must be between 0 and 1: {rate}"
        )));
    }
    Ok(())
}

fn normalize_role(role: Option<String>) -> Option<String> {
    role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}

/// All rates of a company, default (role-less) first
pub async fn find_by_company(
    conn: &mut SqliteConnection,
    company_id: i64,
) -> RepoResult<Vec<CommissionRate>> {
    let rows = sqlx::query_as::<_, RateRow>(
        "SELECT company_id, role, rate, updated_at FROM commission_rate WHERE company_id = ? ORDER BY role IS NOT NULL, role",
    )
    .bind(company_id)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(CommissionRate::try_from).collect()
}

/// Set or replace the rate for `(company_id, role)`
pub async fn upsert(
    pool: &SqlitePool,
    company_id: i64,
    data: CommissionRateUpsert,
) -> RepoResult<CommissionRate> {
    validate_rate(data.rate)?;
    let role = normalize_role(data.role);
    let rate = data.rate.normalize().to_string();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;
    let updated = sqlx::query(
        "UPDATE commission_rate SET rate = ?1, updated_at = ?2 WHERE company_id = ?3 AND role IS ?4",
    )
    .bind(&rate)
    .bind(now)
    .bind(company_id)
    .bind(&role)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        sqlx::query(
            "INSERT INTO commission_rate (company_id, role, rate, updated_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(company_id)
        .bind(&role)
        .bind(&rate)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(CommissionRate {
        company_id,
        role,
        rate: data.rate.normalize(),
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromStr;

    #[test]
    fn test_validate_rate_bounds() {
        assert!(validate_rate(Decimal::ZERO).is_ok());
        assert!(validate_rate(Decimal::ONE).is_ok());
        assert!(validate_rate(Decimal::from_str("0.05").unwrap()).is_ok());
        assert!(validate_rate(Decimal::from_str("-0.01").unwrap()).is_err());
        assert!(validate_rate(Decimal::from_str("1.5").unwrap()).is_err());
    }

    #[test]
    fn test_normalize_role() {
        assert_eq!(normalize_role(None), None);
        assert_eq!(normalize_role(Some("  ".into())), None);
        assert_eq!(normalize_role(Some(" sales ".into())), Some("sales".into()));
    }
}
