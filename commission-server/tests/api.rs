//! HTTP surface, exercised in-process with `tower::ServiceExt::oneshot`

mod common;

use axum::Router;
use axum::body::Body;
use commission_server::api::build_app;
use commission_server::{Config, ServerState};
use common::{Line, TestDb, dec};
use http::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::models::{CommissionLine, CommissionRate, CommissionRecord, PeriodSummary, SettlementSummary};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    db: TestDb,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.db");
        let config = Config::with_database(path.to_str().unwrap());
        let state = ServerState::initialize(&config).await.unwrap();
        let db = TestDb::from_pool(state.db.pool.clone());
        Self {
            app: build_app(state),
            db,
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn json<T: DeserializeOwned>(&self, method: Method, uri: &str, body: Option<Value>) -> T {
        let (status, bytes) = self.send(method, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&bytes));
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let body: Value = app.json(Method::GET, "/health", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_rate_configuration() {
    let app = TestApp::new().await;

    let saved: CommissionRate = app
        .json(Method::PUT, "/api/commission/rates/1", Some(json!({ "rate": "0.05" })))
        .await;
    assert_eq!(saved.rate, dec("0.05"));
    assert_eq!(saved.role, None);

    let _: CommissionRate = app
        .json(
            Method::PUT,
            "/api/commission/rates/1",
            Some(json!({ "role": "manager", "rate": "0.08" })),
        )
        .await;
    let rates: Vec<CommissionRate> = app.json(Method::GET, "/api/commission/rates/1", None).await;
    assert_eq!(rates.len(), 2);

    let (status, body) = app
        .send(Method::PUT, "/api/commission/rates/1", Some(json!({ "rate": "1.5" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 5004);
}

#[tokio::test]
async fn test_settle_and_query() {
    let app = TestApp::new().await;
    app.db.standard_company().await;
    app.db.order("O1", "2024-03-10", Some(5), Some(1)).await;
    app.db.line(Line::new(1, "O1", "3000")).await;
    app.db.confirm("O1", "3000").await;

    let summary: SettlementSummary = app
        .json(
            Method::POST,
            "/api/commission/settle",
            Some(json!({ "order_ids": ["O1", "MISSING"] })),
        )
        .await;
    assert_eq!(summary.settled.len(), 1);
    assert_eq!(summary.failed.len(), 1);

    let record: CommissionRecord = app
        .json(Method::GET, "/api/commission/beneficiaries/5/records/2024-04", None)
        .await;
    assert_eq!(record.total_sales, dec("3000"));
    assert_eq!(record.commission_amount, dec("150"));

    let lines: Vec<CommissionLine> = app
        .json(
            Method::GET,
            &format!("/api/commission/records/{}/lines", record.id),
            None,
        )
        .await;
    assert_eq!(lines.len(), 1);

    let records: Vec<CommissionRecord> = app
        .json(Method::GET, "/api/commission/periods/2024-04/records", None)
        .await;
    assert_eq!(records.len(), 1);

    let period: PeriodSummary = app
        .json(Method::GET, "/api/commission/periods/2024-04/summary", None)
        .await;
    assert_eq!(period.total_orders, 1);
    assert_eq!(period.total_commission, dec("150"));
}

#[tokio::test]
async fn test_settle_until_request() {
    let app = TestApp::new().await;
    app.db.standard_company().await;
    app.db.simple_order("O1", 1, "2024-03-10", 1, "100", "100").await;
    app.db.simple_order("O2", 2, "2024-04-10", 1, "100", "100").await;

    let summary: SettlementSummary = app
        .json(
            Method::POST,
            "/api/commission/settle",
            Some(json!({ "until": "2024-03-31", "company_id": 1 })),
        )
        .await;
    assert_eq!(summary.settled.len(), 1);
    assert_eq!(summary.settled[0].order_id, "O1");
}

#[tokio::test]
async fn test_not_found_and_bad_period() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/api/commission/beneficiaries/5/records/2024-04", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 5001);

    let (status, _) = app
        .send(Method::GET, "/api/commission/beneficiaries/5/records/2024-13", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/api/commission/records/42/lines", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
