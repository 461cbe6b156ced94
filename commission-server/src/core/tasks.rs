//! 后台任务管理
//!
//! 定时结算任务：每隔 `SETTLE_INTERVAL_SECS` 秒结算业务时区 "今天" 及之前
//! 已确认付款、尚未结算的订单。

use crate::settlement::SettlementEngine;
use chrono::Utc;
use chrono_tz::Tz;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 已注册的后台任务
struct RegisteredTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    /// 全局取消令牌
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（用于任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务，panic 会被捕获并记录
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped = async move {
            if let Err(panic_info) = AssertUnwindSafe(future).catch_unwind().await {
                let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!(task = %name, panic = %panic_msg, "Background task panicked");
            }
        };
        let handle = tokio::spawn(wrapped);
        tracing::debug!(task = %name, "Registered background task");
        self.tasks.push(RegisteredTask { name, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Graceful shutdown - 取消所有任务并等待完成
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();
        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task completed"),
                Err(e) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task panicked"),
            }
        }
        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// 定时结算循环，直到 `shutdown` 被取消
pub async fn run_settlement_scheduler(
    engine: SettlementEngine,
    interval: Duration,
    timezone: Tz,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tracing::info!(interval_secs = interval.as_secs(), %timezone, "Settlement scheduler started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let today = Utc::now().with_timezone(&timezone).date_naive();
        match engine.settle_until(today, None).await {
            Ok(summary) => tracing::info!(
                %today,
                settled = summary.settled.len(),
                rejected = summary.rejected.len(),
                failed = summary.failed.len(),
                aborted = summary.aborted.len(),
                "Scheduled settlement run finished"
            ),
            Err(e) => tracing::error!(%today, error = %e, "Scheduled settlement run failed"),
        }
    }

    tracing::info!("Settlement scheduler stopped");
}
