//! Server State
//!
//! 共享给 HTTP handler 与后台任务的状态 (cheap to clone)

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::settlement::SettlementEngine;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub engine: SettlementEngine,
}

impl ServerState {
    /// 打开数据库 (含迁移) 并构建结算引擎
    pub async fn initialize(config: &Config) -> Result<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path, config.db_max_connections).await?;
        let engine = SettlementEngine::new(db.pool.clone(), config.engine_config());
        tracing::info!(
            proration_base = %config.proration_base,
            worker_concurrency = config.worker_concurrency,
            "Settlement engine ready"
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            db,
            engine,
        })
    }
}
