//! Health check for Elasticsearch

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use inv_common::{BaseHealthResult, HealthCheck};
use tracing::warn;

use crate::client::ElasticsearchClient;

/// Reports healthy while the cluster status is green or yellow
pub struct ElasticsearchHealthCheck {
    client: Arc<ElasticsearchClient>,
}

impl ElasticsearchHealthCheck {
    pub fn new(client: Arc<ElasticsearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthCheck for ElasticsearchHealthCheck {
    async fn check(&self) -> BaseHealthResult {
        let start = Instant::now();
        match self.client.cluster_health().await {
            Ok(health) if health.is_available() => {
                BaseHealthResult::healthy(start.elapsed().as_millis() as u64)
            }
            Ok(health) => {
                warn!(cluster = %health.cluster_name, status = %health.status, "Cluster unavailable");
                BaseHealthResult::unhealthy(format!("cluster status is {}", health.status))
            }
            Err(e) => BaseHealthResult::unhealthy(e.to_string()),
        }
    }

    fn component_name(&self) -> &'static str {
        "elasticsearch"
    }
}
