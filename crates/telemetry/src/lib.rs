//! inv-telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 索引同步失败计数（主库已写入，索引未写入）
pub const INDEX_SYNC_FAILURES_TOTAL: &str = "search_index_sync_failures_total";

/// 通过 reconcile 修复的索引差异计数
pub const INDEX_RECONCILED_TOTAL: &str = "search_index_reconciled_total";

/// 初始化 tracing
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// 按配置选择日志格式
pub fn init_tracing_with_format(log_level: &str, json: bool) {
    if json {
        init_tracing_json(log_level);
    } else {
        init_tracing(log_level);
    }
}

/// 初始化 Prometheus metrics，并注册本服务的指标说明
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!(
        INDEX_SYNC_FAILURES_TOTAL,
        "Search index writes that failed after the primary store write succeeded"
    );
    metrics::describe_counter!(
        INDEX_RECONCILED_TOTAL,
        "Diverged search index entries repaired by reconciliation"
    );
}
