//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Metrics 资源守卫
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, port: u16) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle { server_handle })
}

/// 注册业务指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("badge_unlocks_total", "Total number of badge unlocks");
    metrics::describe_counter!(
        "badge_evaluations_total",
        "Total number of badge unlock checks"
    );
    metrics::describe_histogram!(
        "badge_evaluation_duration_seconds",
        "Badge unlock check duration in seconds"
    );

    metrics::describe_counter!(
        "streak_recalculations_total",
        "Total number of streak recalculation runs"
    );
    metrics::describe_counter!(
        "streak_habit_failures_total",
        "Habits whose recalculation failed"
    );
    metrics::describe_histogram!(
        "streak_recalculation_duration_seconds",
        "Streak recalculation duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录徽章解锁
#[inline]
pub fn record_badge_unlock(badge_id: &str, source: &str) {
    metrics::counter!(
        "badge_unlocks_total",
        "badge_id" => badge_id.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
}

/// 记录一次解锁检查
#[inline]
pub fn record_badge_evaluation(event_type: &str, unlocked: usize, duration_secs: f64) {
    metrics::counter!(
        "badge_evaluations_total",
        "event_type" => event_type.to_string(),
        "unlocked" => (unlocked > 0).to_string()
    )
    .increment(1);

    metrics::histogram!(
        "badge_evaluation_duration_seconds",
        "event_type" => event_type.to_string()
    )
    .record(duration_secs);
}

/// 记录一次连续打卡重算
#[inline]
pub fn record_streak_recalculation(forced: bool, habits: usize, failed: usize, duration_secs: f64) {
    metrics::counter!(
        "streak_recalculations_total",
        "forced" => forced.to_string()
    )
    .increment(1);

    if failed > 0 {
        metrics::counter!("streak_habit_failures_total").increment(failed as u64);
    }

    metrics::histogram!(
        "streak_recalculation_duration_seconds",
        "habits" => habits.to_string()
    )
    .record(duration_secs);
}
