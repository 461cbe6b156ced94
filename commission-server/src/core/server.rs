//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::tasks::{self, BackgroundTasks};
use crate::core::{Config, Result, ServerState};
use std::time::Duration;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let mut background = BackgroundTasks::new();
        if let Some(secs) = self.config.settle_interval_secs {
            let token = background.shutdown_token();
            background.spawn(
                "settlement_scheduler",
                tasks::run_settlement_scheduler(
                    state.engine.clone(),
                    Duration::from_secs(secs),
                    self.config.business_timezone,
                    token,
                ),
            );
        }

        let app = api::build_app(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Commission server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        background.shutdown().await;
        Ok(())
    }
}
