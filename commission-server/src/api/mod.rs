//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`commission`] - 佣金结算、查询与费率配置

pub mod commission;
pub mod health;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(commission::router())
}

/// Build a fully configured application with middleware and state
///
/// Used by both the HTTP server and in-process tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - operator dashboards call from another origin
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
