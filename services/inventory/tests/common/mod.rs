//! 集成测试共用的夹具

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination, RetryConfig};
use inv_config::IndexSyncMode;
use inv_errors::{AppError, AppResult};
use inv_ports::SearchRepository;
use tokio::sync::Notify;

use inventory::api::{AppState, router};
use inventory::application::{IndexSynchronizer, StatusService, StockCurrentService};
use inventory::domain::stock_current::{StockCurrent, StockCurrentId, StockCurrentSearchRepository};
use inventory::infrastructure::persistence::{
    InMemoryStatusRepository, InMemoryStockCurrentRepository,
};
use inventory::infrastructure::search::InMemorySearchIndex;

/// 暂停下一次批量写入：`reached` 在写入前通知，等待 `resume` 后继续
#[derive(Clone, Default)]
pub struct BulkGate {
    pub reached: Arc<Notify>,
    pub resume: Arc<Notify>,
}

/// 可以手动切换为不可用的搜索索引
pub struct FlakySearchIndex {
    inner: InMemorySearchIndex<StockCurrent>,
    failing: AtomicBool,
    write_attempts: AtomicU32,
    gate: Mutex<Option<BulkGate>>,
}

impl FlakySearchIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemorySearchIndex::new(),
            failing: AtomicBool::new(false),
            write_attempts: AtomicU32::new(0),
            gate: Mutex::new(None),
        }
    }

    pub fn pause_next_bulk(&self) -> BulkGate {
        let gate = BulkGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// index/delete 的调用次数，含失败的尝试
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// 绕过故障开关直接查看索引内容
    pub async fn contains(&self, id: StockCurrentId) -> bool {
        self.indexed()
            .search("*", &Pagination::new(1, Pagination::MAX_PAGE_SIZE))
            .await
            .map(|page| page.items.iter().any(|s| s.id == Some(id)))
            .unwrap_or(false)
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    fn indexed(&self) -> &dyn StockCurrentSearchRepository {
        &self.inner
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::external_service("search index unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchRepository<StockCurrent, StockCurrentId> for FlakySearchIndex {
    async fn index(&self, document: &StockCurrent) -> AppResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.indexed().index(document).await
    }

    async fn index_all(&self, documents: &[StockCurrent]) -> AppResult<()> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.resume.notified().await;
        }
        self.check()?;
        self.indexed().index_all(documents).await
    }

    async fn delete(&self, id: &StockCurrentId) -> AppResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.indexed().delete(id).await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.check()?;
        self.indexed().delete_all().await
    }

    async fn search(
        &self,
        query: &str,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockCurrent>> {
        self.check()?;
        self.indexed().search(query, pagination).await
    }
}

pub struct Fixture {
    pub service: Arc<StockCurrentService>,
    pub statuses: Arc<StatusService>,
    pub repository: Arc<InMemoryStockCurrentRepository>,
    pub search: Arc<FlakySearchIndex>,
}

impl Fixture {
    pub fn new(mode: IndexSyncMode) -> Self {
        let repository = Arc::new(InMemoryStockCurrentRepository::new());
        let search = Arc::new(FlakySearchIndex::new());
        // 两次尝试，不等待
        let sync = IndexSynchronizer::new(
            StockCurrentService::entity_name(),
            mode,
            RetryConfig::new(2, Duration::ZERO, Duration::ZERO),
        );
        let service = Arc::new(StockCurrentService::new(
            repository.clone(),
            search.clone(),
            sync,
            2,
        ));
        let statuses = Arc::new(StatusService::new(Arc::new(InMemoryStatusRepository::new())));

        Self {
            service,
            statuses,
            repository,
            search,
        }
    }

    pub fn router(&self) -> axum::Router {
        router(AppState::new(self.service.clone(), self.statuses.clone()))
    }
}
