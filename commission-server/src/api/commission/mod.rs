//! Commission API 模块 (佣金结算)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/commission/settle | POST | 批量结算 (按订单 / 按日期) |
//! | /api/commission/beneficiaries/{beneficiary_id}/records/{period} | GET | 单个佣金记录 |
//! | /api/commission/records/{record_id}/lines | GET | 审计明细 |
//! | /api/commission/periods/{period}/records | GET | 期间内所有记录 |
//! | /api/commission/periods/{period}/summary | GET | 期间汇总 |
//! | /api/commission/rates/{company_id} | GET / PUT | 佣金费率配置 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/commission", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/settle", post(handler::settle))
        .route(
            "/beneficiaries/{beneficiary_id}/records/{period}",
            get(handler::get_record),
        )
        .route("/records/{record_id}/lines", get(handler::list_lines))
        .route("/periods/{period}/records", get(handler::list_records))
        .route("/periods/{period}/summary", get(handler::period_summary))
        .route(
            "/rates/{company_id}",
            get(handler::list_rates).put(handler::set_rate),
        )
}
