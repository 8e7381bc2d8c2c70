//! PostgreSQL 健康检查

use std::time::Instant;

use async_trait::async_trait;
use inv_common::{BaseHealthResult, HealthCheck};
use inv_errors::{AppError, AppResult};
use sqlx::PgPool;

/// 检查连接池是否可用
pub async fn check_connection(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Database health check failed: {}", e)))?;
    Ok(())
}

/// 基于连接池的健康检查
pub struct PostgresHealthCheck {
    pool: PgPool,
}

impl PostgresHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PostgresHealthCheck {
    async fn check(&self) -> BaseHealthResult {
        let start = Instant::now();
        match check_connection(&self.pool).await {
            Ok(()) => BaseHealthResult::healthy(start.elapsed().as_millis() as u64),
            Err(e) => BaseHealthResult::unhealthy(e.to_string()),
        }
    }

    fn component_name(&self) -> &'static str {
        "postgres"
    }
}
