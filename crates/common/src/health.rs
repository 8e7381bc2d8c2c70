//! 通用健康检查模块
//!
//! 提供健康检查的通用 trait 和基础类型

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// 基础健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseHealthResult {
    /// 是否健康
    pub healthy: bool,
    /// 延迟（毫秒）
    pub latency_ms: Option<u64>,
    /// 错误信息
    pub error: Option<String>,
}

impl BaseHealthResult {
    /// 创建健康结果
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            healthy: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    /// 创建不健康结果
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    /// 创建超时结果
    pub fn timeout() -> Self {
        Self {
            healthy: false,
            latency_ms: None,
            error: Some("Health check timed out".to_string()),
        }
    }
}

/// 健康检查 trait
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// 执行健康检查
    async fn check(&self) -> BaseHealthResult;

    /// 获取组件名称
    fn component_name(&self) -> &'static str;
}

/// 聚合多个健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedHealthResult {
    /// 整体是否健康
    pub healthy: bool,
    /// 各组件状态
    pub components: Vec<ComponentHealth>,
}

/// 组件健康状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 组件名称
    pub name: String,
    /// 是否健康
    pub healthy: bool,
    /// 延迟（毫秒）
    pub latency_ms: Option<u64>,
    /// 错误信息
    pub error: Option<String>,
}

impl AggregatedHealthResult {
    /// 创建新的聚合结果
    pub fn new() -> Self {
        Self {
            healthy: true,
            components: Vec::new(),
        }
    }

    /// 添加组件状态
    pub fn add_component(&mut self, name: impl Into<String>, result: BaseHealthResult) {
        let component = ComponentHealth {
            name: name.into(),
            healthy: result.healthy,
            latency_ms: result.latency_ms,
            error: result.error,
        };

        if !component.healthy {
            self.healthy = false;
        }

        self.components.push(component);
    }

    /// 获取健康组件数量
    pub fn healthy_count(&self) -> usize {
        self.components.iter().filter(|c| c.healthy).count()
    }

    /// 获取总组件数量
    pub fn total_count(&self) -> usize {
        self.components.len()
    }
}

impl Default for AggregatedHealthResult {
    fn default() -> Self {
        Self::new()
    }
}

/// 依次执行所有健康检查，单个检查超时记为不健康
pub async fn check_all(
    checks: &[Arc<dyn HealthCheck>],
    timeout: Duration,
) -> AggregatedHealthResult {
    let mut aggregated = AggregatedHealthResult::new();

    for check in checks {
        let start = Instant::now();
        let result = match tokio::time::timeout(timeout, check.check()).await {
            Ok(result) => result,
            Err(_) => BaseHealthResult::timeout(),
        };

        if result.healthy {
            debug!(
                component = check.component_name(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Health check passed"
            );
        } else {
            error!(
                component = check.component_name(),
                error = result.error.as_deref().unwrap_or("unknown"),
                "Health check failed"
            );
        }

        aggregated.add_component(check.component_name(), result);
    }

    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticCheck {
        name: &'static str,
        healthy: bool,
    }

    #[async_trait]
    impl HealthCheck for StaticCheck {
        async fn check(&self) -> BaseHealthResult {
            if self.healthy {
                BaseHealthResult::healthy(1)
            } else {
                BaseHealthResult::unhealthy("down")
            }
        }

        fn component_name(&self) -> &'static str {
            self.name
        }
    }

    struct SlowCheck;

    #[async_trait]
    impl HealthCheck for SlowCheck {
        async fn check(&self) -> BaseHealthResult {
            tokio::time::sleep(Duration::from_secs(5)).await;
            BaseHealthResult::healthy(5000)
        }

        fn component_name(&self) -> &'static str {
            "slow"
        }
    }

    #[test]
    fn test_base_health_result() {
        let healthy = BaseHealthResult::healthy(10);
        assert!(healthy.healthy);
        assert_eq!(healthy.latency_ms, Some(10));
        assert!(healthy.error.is_none());

        let unhealthy = BaseHealthResult::unhealthy("Connection failed");
        assert!(!unhealthy.healthy);
        assert!(unhealthy.latency_ms.is_none());
        assert_eq!(unhealthy.error, Some("Connection failed".to_string()));

        let timeout = BaseHealthResult::timeout();
        assert!(!timeout.healthy);
        assert!(timeout.error.is_some());
    }

    #[test]
    fn test_aggregated_health_result() {
        let mut result = AggregatedHealthResult::new();
        result.add_component("postgres", BaseHealthResult::healthy(3));
        assert!(result.healthy);

        result.add_component("search", BaseHealthResult::unhealthy("refused"));
        assert!(!result.healthy);
        assert_eq!(result.healthy_count(), 1);
        assert_eq!(result.total_count(), 2);
    }

    #[tokio::test]
    async fn test_check_all() {
        let checks: Vec<Arc<dyn HealthCheck>> = vec![
            Arc::new(StaticCheck {
                name: "postgres",
                healthy: true,
            }),
            Arc::new(StaticCheck {
                name: "search",
                healthy: false,
            }),
        ];

        let result = check_all(&checks, Duration::from_secs(1)).await;
        assert!(!result.healthy);
        assert_eq!(result.components[0].name, "postgres");
        assert!(result.components[0].healthy);
        assert_eq!(result.components[1].error.as_deref(), Some("down"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_all_timeout() {
        let checks: Vec<Arc<dyn HealthCheck>> = vec![Arc::new(SlowCheck)];
        let result = check_all(&checks, Duration::from_millis(100)).await;
        assert!(!result.healthy);
        assert_eq!(
            result.components[0].error.as_deref(),
            Some("Health check timed out")
        );
    }
}
