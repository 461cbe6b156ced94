//! Database Module
//!
//! SQLite connection pool and embedded migrations

pub mod repository;

use crate::utils::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Database file name used when the service is pointed at a directory
pub const DB_FILE_NAME: &str = "commission.db";

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL mode and apply migrations
    pub async fn new(db_path: &str, max_connections: u32) -> Result<Self, AppError> {
        // WAL, foreign keys, normal sync
        // busy_timeout: 写冲突时等待 5s 而非立即失败 (per connection)
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(5000))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(
            path = %db_path,
            max_connections,
            "Database connection established (SQLite WAL, busy_timeout=5000ms)"
        );

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Open `commission.db` inside `dir`
    pub async fn in_dir(dir: impl AsRef<Path>, max_connections: u32) -> Result<Self, AppError> {
        let path = dir.as_ref().join(DB_FILE_NAME);
        let path = path
            .to_str()
            .ok_or_else(|| AppError::database("Database path is not valid UTF-8"))?
            .to_string();
        Self::new(&path, max_connections).await
    }
}
