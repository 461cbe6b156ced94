//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level when set.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Log file prefix used by the daily roller
const LOG_FILE_PREFIX: &str = "commission-server";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional daily file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},sqlx=warn,tower_http=info"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if (log_path.exists() || std::fs::create_dir_all(log_path).is_ok())
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, LOG_FILE_PREFIX);
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
    }

    let _ = subscriber.try_init();
}
