//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 服务与数据库状态 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    version: &'static str,
    database: bool,
    environment: String,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db.pool)
        .await
        .is_ok();
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        environment: state.config.environment.clone(),
    })
}
