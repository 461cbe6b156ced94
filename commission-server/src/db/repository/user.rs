//! User Repository (beneficiary lookup)

use super::RepoResult;
use shared::models::User;
use sqlx::SqliteConnection;

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, company_id, username, role, is_active FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}
