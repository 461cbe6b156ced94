//! Shared fixtures: a throwaway SQLite database seeded with upstream rows
#![allow(dead_code)]

use commission_server::db::DbService;
use commission_server::{EngineConfig, ProrationBase, SettlementEngine};
use rust_decimal::Decimal;
use shared::models::Period;
use sqlx::SqlitePool;
use std::str::FromStr;
use tempfile::TempDir;

pub struct TestDb {
    pub pool: SqlitePool,
    // keeps the directory alive for the duration of the test
    _dir: Option<TempDir>,
}

impl TestDb {
    pub async fn new() -> Self {
        Self::with_connections(8).await
    }

    pub async fn with_connections(max_connections: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = DbService::in_dir(dir.path(), max_connections).await.unwrap();
        Self {
            pool: db.pool,
            _dir: Some(dir),
        }
    }

    /// Seed through a pool owned by someone else (e.g. a `ServerState`)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool, _dir: None }
    }

    pub fn engine(&self) -> SettlementEngine {
        self.engine_with(EngineConfig::default())
    }

    pub fn engine_with(&self, config: EngineConfig) -> SettlementEngine {
        SettlementEngine::new(self.pool.clone(), config)
    }

    pub fn engine_attributed(&self) -> SettlementEngine {
        self.engine_with(EngineConfig {
            proration_base: ProrationBase::AttributedLines,
            ..EngineConfig::default()
        })
    }

    pub async fn user(&self, id: i64, company_id: i64, role: Option<&str>) {
        sqlx::query("INSERT INTO users (id, company_id, username, role, is_active) VALUES (?, ?, ?, ?, 1)")
            .bind(id)
            .bind(company_id)
            .bind(format!("user{id}"))
            .bind(role)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// User not attached to any company
    pub async fn loose_user(&self, id: i64) {
        sqlx::query("INSERT INTO users (id, company_id, username, role, is_active) VALUES (?, NULL, ?, NULL, 1)")
            .bind(id)
            .bind(format!("user{id}"))
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn rate(&self, company_id: i64, role: Option<&str>, rate: &str) {
        sqlx::query("INSERT INTO commission_rate (company_id, role, rate, updated_at) VALUES (?, ?, ?, 0)")
            .bind(company_id)
            .bind(role)
            .bind(rate)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn order(&self, id: &str, date: &str, creator: Option<i64>, company: Option<i64>) {
        sqlx::query("INSERT INTO orders (id, order_date, total_amount, creator_id, company_id, order_status) VALUES (?, ?, '0', ?, ?, 'Completed')")
            .bind(id)
            .bind(date)
            .bind(creator)
            .bind(company)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn line(&self, line: Line<'_>) {
        sqlx::query("INSERT INTO order_items (id, parent_order_id, product_name, quantity, net_total, creator_id, is_freebie, parent_item_id) VALUES (?, ?, 'item', 1, ?, ?, ?, ?)")
            .bind(line.id)
            .bind(line.order_id)
            .bind(line.net)
            .bind(line.creator)
            .bind(line.freebie)
            .bind(line.parent)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn payment(&self, order_id: &str, amount: &str, action: &str) {
        sqlx::query("INSERT INTO payment_confirmation (order_id, confirmed_amount, confirmed_action, confirmed_at) VALUES (?, ?, ?, 0)")
            .bind(order_id)
            .bind(amount)
            .bind(action)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn confirm(&self, order_id: &str, amount: &str) {
        self.payment(order_id, amount, "Confirmed").await;
    }

    /// Company 1 at 5%, with users 1, 5, 9 (no role)
    pub async fn standard_company(&self) {
        self.rate(1, None, "0.05").await;
        for id in [1, 5, 9] {
            self.user(id, 1, None).await;
        }
    }

    /// One-line confirmed order in company 1
    pub async fn simple_order(&self, id: &str, line_id: i64, date: &str, creator: i64, net: &str, paid: &str) {
        self.order(id, date, Some(creator), Some(1)).await;
        self.line(Line::new(line_id, id, net)).await;
        self.confirm(id, paid).await;
    }

    pub async fn count_lines(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM commission_line")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn count_records(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM commission_record")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub struct Line<'a> {
    pub id: i64,
    pub order_id: &'a str,
    pub net: &'a str,
    pub creator: Option<i64>,
    pub freebie: bool,
    pub parent: Option<i64>,
}

impl<'a> Line<'a> {
    pub fn new(id: i64, order_id: &'a str, net: &'a str) -> Self {
        Self {
            id,
            order_id,
            net,
            creator: None,
            freebie: false,
            parent: None,
        }
    }

    pub fn creator(mut self, creator: i64) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn freebie(mut self) -> Self {
        self.freebie = true;
        self
    }

    pub fn child_of(mut self, parent: i64) -> Self {
        self.parent = Some(parent);
        self
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn period(s: &str) -> Period {
    s.parse().unwrap()
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
