//! Commission Server - 佣金结算服务
//!
//! # 架构概述
//!
//! 将已确认的付款转换为按销售人员、按结算期间的佣金记录：
//!
//! - **结算引擎** (`settlement`): 资格过滤、期间解析、按付款比例分摊、受益人归属、幂等聚合
//! - **数据库** (`db`): SQLite (sqlx)，嵌入式迁移
//! - **HTTP API** (`api`): 结算触发、记录查询、费率配置
//!
//! # 模块结构
//!
//! ```text
//! commission-server/src/
//! ├── core/          # 配置、状态、错误、定时任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (repository)
//! ├── money/         # 金额精度 (rust_decimal)
//! ├── settlement/    # 结算引擎
//! └── utils/         # 错误映射、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod money;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use settlement::{EngineConfig, ProrationBase, SettlementEngine, SettlementError};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: dotenv → 配置 → 日志
pub fn setup_environment() -> Result<Config, ServerError> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}
