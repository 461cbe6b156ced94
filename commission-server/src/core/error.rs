use thiserror::Error;

/// 服务器启动/运行错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(#[from] shared::error::AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
