//! 搜索索引同步
//!
//! 主库写入成功后再写索引。索引写入遇到临时性错误时按配置重试，仍失败时记录差异账本、
//! 计数并打错误日志，然后按同步模式决定是否向调用方报错。主库的修改不回滚。

use std::collections::BTreeSet;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use inv_common::{RetryConfig, with_conditional_retry};
use inv_config::{IndexSyncConfig, IndexSyncMode};
use inv_errors::{AppError, AppResult};
use inv_telemetry::INDEX_SYNC_FAILURES_TOTAL;
use metrics::counter;
use tokio::sync::Mutex;
use tracing::error;

use super::RequestContext;

/// 需要同步到索引的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Index,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Index => "index",
            SyncOperation::Delete => "delete",
        }
    }
}

/// 单个实体类型的索引同步器
pub struct IndexSynchronizer<ID> {
    entity: &'static str,
    mode: IndexSyncMode,
    retry: RetryConfig,
    pending: Mutex<BTreeSet<ID>>,
}

impl<ID> IndexSynchronizer<ID>
where
    ID: Ord + Clone + Display + Send,
{
    pub fn new(entity: &'static str, mode: IndexSyncMode, retry: RetryConfig) -> Self {
        Self {
            entity,
            mode,
            retry,
            pending: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn from_config(entity: &'static str, config: &IndexSyncConfig) -> Self {
        let retry = RetryConfig::new(
            config.retry_max_attempts,
            Duration::from_millis(config.retry_initial_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        );
        Self::new(entity, config.mode, retry)
    }

    pub fn mode(&self) -> IndexSyncMode {
        self.mode
    }

    /// 执行一次索引写入
    ///
    /// 成功时把 ID 移出差异账本；失败时记入账本，best_effort 模式返回 Ok，
    /// strict 模式返回 `AppError::IndexSync`
    pub async fn sync<F, Fut>(
        &self,
        ctx: &RequestContext,
        operation: SyncOperation,
        id: &ID,
        op: F,
    ) -> AppResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let name = format!("{}.{}", self.entity, operation.as_str());
        match with_conditional_retry(&self.retry, &name, op, AppError::is_transient).await {
            Ok(()) => {
                self.mark_synced(id).await;
                Ok(())
            }
            Err(e) => {
                self.pending.lock().await.insert(id.clone());
                counter!(
                    INDEX_SYNC_FAILURES_TOTAL,
                    "entity" => self.entity,
                    "operation" => operation.as_str()
                )
                .increment(1);
                error!(
                    request_id = %ctx.request_id,
                    entity = self.entity,
                    operation = operation.as_str(),
                    id = %id,
                    error = %e,
                    "Primary store updated but search index is out of sync"
                );

                match self.mode {
                    IndexSyncMode::BestEffort => Ok(()),
                    IndexSyncMode::Strict => Err(AppError::index_sync(format!(
                        "{} {} was written to the primary store but the search index {} failed: {}",
                        self.entity,
                        id,
                        operation.as_str(),
                        e
                    ))),
                }
            }
        }
    }

    /// 当前未同步的 ID，升序
    pub async fn pending(&self) -> Vec<ID> {
        self.pending.lock().await.iter().cloned().collect()
    }

    pub async fn is_pending(&self, id: &ID) -> bool {
        self.pending.lock().await.contains(id)
    }

    pub async fn mark_synced(&self, id: &ID) {
        self.pending.lock().await.remove(id);
    }

    /// 批量移出账本，其他 ID 保持不变
    pub async fn mark_all_synced(&self, ids: &[ID]) {
        let mut pending = self.pending.lock().await;
        for id in ids {
            pending.remove(id);
        }
    }
}
