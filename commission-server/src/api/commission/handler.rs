//! Commission API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    CommissionLine, CommissionRate, CommissionRateUpsert, CommissionRecord, Period, PeriodSummary,
    SettleRequest, SettlementSummary,
};

fn parse_period(value: &str) -> AppResult<Period> {
    value
        .parse::<Period>()
        .map_err(|e| AppError::with_message(ErrorCode::SettlementPeriodInvalid, e.to_string()))
}

/// POST /api/commission/settle - 批量结算
///
/// Body: `{ "order_ids": [...] }` 或 `{ "until": "YYYY-MM-DD", "company_id": 1 }`
pub async fn settle(
    State(state): State<ServerState>,
    Json(request): Json<SettleRequest>,
) -> AppResult<Json<SettlementSummary>> {
    let summary = match request {
        SettleRequest::Orders { order_ids } => state.engine.settle(&order_ids).await?,
        SettleRequest::Until { until, company_id } => {
            state.engine.settle_until(until, company_id).await?
        }
    };
    Ok(Json(summary))
}

/// GET /api/commission/beneficiaries/:beneficiary_id/records/:period - 获取佣金记录
pub async fn get_record(
    State(state): State<ServerState>,
    Path((beneficiary_id, period)): Path<(i64, String)>,
) -> AppResult<Json<CommissionRecord>> {
    let period = parse_period(&period)?;
    let record = state
        .engine
        .get_record(beneficiary_id, period)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CommissionRecordNotFound,
                format!("No commission record for beneficiary {beneficiary_id} in {period}"),
            )
        })?;
    Ok(Json(record))
}

/// GET /api/commission/records/:record_id/lines - 审计明细
pub async fn list_lines(
    State(state): State<ServerState>,
    Path(record_id): Path<i64>,
) -> AppResult<Json<Vec<CommissionLine>>> {
    let lines = state.engine.list_lines(record_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CommissionRecordNotFound,
            format!("Commission record {record_id} not found"),
        )
    })?;
    Ok(Json(lines))
}

/// GET /api/commission/periods/:period/records - 期间内所有记录
pub async fn list_records(
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> AppResult<Json<Vec<CommissionRecord>>> {
    let period = parse_period(&period)?;
    Ok(Json(state.engine.list_records(period).await?))
}

/// GET /api/commission/periods/:period/summary - 期间汇总
pub async fn period_summary(
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> AppResult<Json<PeriodSummary>> {
    let period = parse_period(&period)?;
    Ok(Json(state.engine.period_summary(period).await?))
}

/// GET /api/commission/rates/:company_id - 获取公司费率
pub async fn list_rates(
    State(state): State<ServerState>,
    Path(company_id): Path<i64>,
) -> AppResult<Json<Vec<CommissionRate>>> {
    Ok(Json(state.engine.list_rates(company_id).await?))
}

/// PUT /api/commission/rates/:company_id - 设置费率 (role 为空即公司默认费率)
pub async fn set_rate(
    State(state): State<ServerState>,
    Path(company_id): Path<i64>,
    Json(payload): Json<CommissionRateUpsert>,
) -> AppResult<Json<CommissionRate>> {
    if payload.rate < Decimal::ZERO || payload.rate > Decimal::ONE {
        return Err(AppError::with_message(
            ErrorCode::CommissionRateInvalid,
            format!("Commission rate must be between 0 and 1, got {}", payload.rate),
        ));
    }
    Ok(Json(state.engine.set_rate(company_id, payload).await?))
}
