//! 当前库存服务
//!
//! 写操作先写主库，成功后同步到搜索索引；按键查询和分页列表读主库，
//! 全文检索读索引。

use std::sync::Arc;

use inv_common::{PagedResult, Pagination, SortOrder};
use inv_errors::{AppError, AppResult};
use inv_telemetry::INDEX_RECONCILED_TOTAL;
use metrics::counter;
use tracing::{debug, info, warn};

use crate::application::dto::StockCurrentDto;
use crate::application::{IndexSynchronizer, RequestContext, SyncOperation};
use crate::domain::stock_current::{
    ProductId, StockCurrent, StockCurrentId, StockCurrentRepository,
    StockCurrentSearchRepository, normalize_sort,
};
use crate::error::InventoryError;

const ENTITY: &str = "stock_current";

/// 对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 主库中存在，已重新写入索引
    pub reindexed: Vec<StockCurrentId>,
    /// 主库中已删除，已从索引移除
    pub removed: Vec<StockCurrentId>,
    /// 仍未同步，留在账本中
    pub failed: Vec<StockCurrentId>,
}

impl ReconcileReport {
    pub fn repaired(&self) -> usize {
        self.reindexed.len() + self.removed.len()
    }
}

pub struct StockCurrentService {
    repository: Arc<dyn StockCurrentRepository>,
    search: Arc<dyn StockCurrentSearchRepository>,
    sync: IndexSynchronizer<StockCurrentId>,
    reindex_batch_size: u32,
}

impl StockCurrentService {
    pub fn new(
        repository: Arc<dyn StockCurrentRepository>,
        search: Arc<dyn StockCurrentSearchRepository>,
        sync: IndexSynchronizer<StockCurrentId>,
        reindex_batch_size: u32,
    ) -> Self {
        Self {
            repository,
            search,
            sync,
            reindex_batch_size: reindex_batch_size.max(1),
        }
    }

    pub fn entity_name() -> &'static str {
        ENTITY
    }

    /// 保存记录：无 ID 时插入，有 ID 时更新
    pub async fn save(
        &self,
        ctx: &RequestContext,
        dto: StockCurrentDto,
    ) -> AppResult<StockCurrentDto> {
        debug!(request_id = %ctx.request_id, ?dto, "Request to save StockCurrent");

        let entity = StockCurrent::from(dto);
        let saved = self.repository.save(&entity).await?;
        let id = saved
            .id
            .ok_or_else(|| {
                AppError::from(InventoryError::Internal(
                    "Primary store returned a record without id".to_string(),
                ))
            })?;

        self.sync
            .sync(ctx, SyncOperation::Index, &id, || self.search.index(&saved))
            .await?;

        Ok(saved.into())
    }

    /// 分页查询
    pub async fn find_all(
        &self,
        ctx: &RequestContext,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockCurrentDto>> {
        debug!(
            request_id = %ctx.request_id,
            page = pagination.page,
            size = pagination.page_size,
            "Request to get all StockCurrents"
        );

        let pagination = normalize_sort(pagination)?;
        let page = self.repository.find_all(&pagination).await?;
        Ok(page.map(StockCurrentDto::from))
    }

    /// 查询未关联产品的记录
    pub async fn find_all_where_product_is_null(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<Vec<StockCurrentDto>> {
        debug!(request_id = %ctx.request_id, "Request to get all StockCurrents where Product is null");

        let items = self.repository.find_all_where_product_is_null().await?;
        Ok(items.into_iter().map(StockCurrentDto::from).collect())
    }

    pub async fn find_one(
        &self,
        ctx: &RequestContext,
        id: StockCurrentId,
    ) -> AppResult<Option<StockCurrentDto>> {
        debug!(request_id = %ctx.request_id, %id, "Request to get StockCurrent");

        Ok(self.repository.find_by_id(&id).await?.map(StockCurrentDto::from))
    }

    pub async fn find_by_product_id(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
    ) -> AppResult<Option<StockCurrentDto>> {
        debug!(request_id = %ctx.request_id, %product_id, "Request to get StockCurrent by product");

        Ok(self
            .repository
            .find_by_product_id(product_id)
            .await?
            .map(StockCurrentDto::from))
    }

    /// 删除记录，ID 不存在时不报错
    pub async fn delete(&self, ctx: &RequestContext, id: StockCurrentId) -> AppResult<()> {
        debug!(request_id = %ctx.request_id, %id, "Request to delete StockCurrent");

        self.repository.delete(&id).await?;
        self.sync
            .sync(ctx, SyncOperation::Delete, &id, || self.search.delete(&id))
            .await
    }

    /// 全文检索
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: &str,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockCurrentDto>> {
        debug!(request_id = %ctx.request_id, query, "Request to search for a page of StockCurrents");

        let pagination = normalize_sort(pagination)?;
        let page = self.search.search(query, &pagination).await?;
        Ok(page.map(StockCurrentDto::from))
    }

    /// 清空索引后从主库分批重建，返回写入的记录数
    pub async fn reindex(&self, ctx: &RequestContext) -> AppResult<u64> {
        info!(
            request_id = %ctx.request_id,
            principal = ctx.principal_or_anonymous(),
            "Rebuilding StockCurrent search index"
        );

        // 重建期间新产生的差异不在快照内，留给 reconcile 处理
        let repaired = self.sync.pending().await;
        self.search.delete_all().await?;

        let mut indexed = 0u64;
        let mut page = 1u32;
        loop {
            let pagination =
                Pagination::new(page, self.reindex_batch_size).with_sort(SortOrder::asc("id"));
            let batch = self.repository.find_all(&pagination).await?;
            if batch.items.is_empty() {
                break;
            }

            self.search.index_all(&batch.items).await?;
            indexed += batch.items.len() as u64;
            debug!(request_id = %ctx.request_id, page, indexed, "Reindexed batch");

            if pagination.offset() + pagination.limit() >= batch.total {
                break;
            }
            page += 1;
        }

        self.sync.mark_all_synced(&repaired).await;
        info!(request_id = %ctx.request_id, indexed, "StockCurrent search index rebuilt");
        Ok(indexed)
    }

    /// 修复差异账本中的记录
    ///
    /// 主库中仍存在的记录重新写入索引，已删除的从索引移除
    pub async fn reconcile(&self, ctx: &RequestContext) -> AppResult<ReconcileReport> {
        let pending = self.sync.pending().await;
        info!(
            request_id = %ctx.request_id,
            pending = pending.len(),
            "Reconciling StockCurrent search index"
        );

        let mut report = ReconcileReport::default();
        for id in pending {
            let result = match self.repository.find_by_id(&id).await? {
                Some(record) => self
                    .search
                    .index(&record)
                    .await
                    .map(|_| SyncOperation::Index),
                None => self.search.delete(&id).await.map(|_| SyncOperation::Delete),
            };

            match result {
                Ok(operation) => {
                    self.sync.mark_synced(&id).await;
                    counter!(
                        INDEX_RECONCILED_TOTAL,
                        "entity" => ENTITY,
                        "operation" => operation.as_str()
                    )
                    .increment(1);
                    match operation {
                        SyncOperation::Index => report.reindexed.push(id),
                        SyncOperation::Delete => report.removed.push(id),
                    }
                }
                Err(e) => {
                    warn!(request_id = %ctx.request_id, %id, error = %e, "Reconcile failed");
                    report.failed.push(id);
                }
            }
        }

        info!(
            request_id = %ctx.request_id,
            repaired = report.repaired(),
            failed = report.failed.len(),
            "Reconcile finished"
        );
        Ok(report)
    }

    /// 当前已知与主库不一致的 ID
    pub async fn pending_divergences(&self) -> Vec<StockCurrentId> {
        self.sync.pending().await
    }
}
