use crate::core::ServerError;
use crate::settlement::{EngineConfig, ProrationBase};
use chrono_tz::Tz;

/// 服务器配置 - 结算服务的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | ./data/commission.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | WORKER_CONCURRENCY | 4 | 并行结算的订单数 |
/// | DB_MAX_CONNECTIONS | 8 | 连接池大小 |
/// | PRORATION_BASE | eligible_lines | 分摊基数: eligible_lines / attributed_lines |
/// | SETTLE_INTERVAL_SECS | (unset) | 定时结算间隔，未设置则不启动 |
/// | BUSINESS_TIMEZONE | UTC | 业务日历时区 (IANA) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 日志目录，按天滚动 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/commission.db SETTLE_INTERVAL_SECS=3600 commission-server serve
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 并行结算的订单数
    pub worker_concurrency: usize,
    /// 连接池大小
    pub db_max_connections: u32,
    pub proration_base: ProrationBase,
    /// 定时结算间隔 (秒)
    pub settle_interval_secs: Option<u64>,
    /// "今天" 按此时区计算
    pub business_timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的使用默认值；`PRORATION_BASE` / `BUSINESS_TIMEZONE` 无法解析时报错
    pub fn from_env() -> Result<Self, ServerError> {
        let proration_base = match std::env::var("PRORATION_BASE") {
            Ok(v) => v.parse::<ProrationBase>().map_err(ServerError::Config)?,
            Err(_) => ProrationBase::default(),
        };
        let business_timezone = match std::env::var("BUSINESS_TIMEZONE") {
            Ok(v) => v
                .trim()
                .parse::<Tz>()
                .map_err(|e| ServerError::Config(format!("BUSINESS_TIMEZONE: {e}")))?,
            Err(_) => Tz::UTC,
        };

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/commission.db".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            worker_concurrency: env_parse("WORKER_CONCURRENCY").unwrap_or(4),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(8),
            proration_base,
            settle_interval_secs: env_parse::<u64>("SETTLE_INTERVAL_SECS").filter(|s| *s > 0),
            business_timezone,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        })
    }

    /// 指定数据库路径，其余取默认值
    ///
    /// 常用于测试场景
    pub fn with_database(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            http_port: 3000,
            worker_concurrency: 4,
            db_max_connections: 8,
            proration_base: ProrationBase::default(),
            settle_interval_secs: None,
            business_timezone: Tz::UTC,
            log_level: "info".into(),
            log_dir: None,
            environment: "development".into(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            worker_concurrency: self.worker_concurrency.max(1),
            proration_base: self.proration_base,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
