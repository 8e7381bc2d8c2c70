//! 内存仓储实现，用于开发模式和测试

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination};
use inv_errors::AppResult;
use inv_ports::{PageableRepository, Repository};
use tokio::sync::RwLock;

use crate::domain::status::{Status, StatusId};
use crate::domain::stock_current::{
    ProductId, StockCurrent, StockCurrentId, StockCurrentRepository, compare_by_sort,
};
use crate::error::InventoryError;

fn page_of<T: Clone>(items: Vec<T>, pagination: &Pagination) -> PagedResult<T> {
    let total = items.len() as u64;
    let page = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();
    PagedResult::new(page, total, pagination)
}

/// 内存库存仓储，与 PostgreSQL 表一样约束 product_id 唯一
pub struct InMemoryStockCurrentRepository {
    rows: RwLock<BTreeMap<StockCurrentId, StockCurrent>>,
    next_id: AtomicI64,
}

impl InMemoryStockCurrentRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStockCurrentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<StockCurrent, StockCurrentId> for InMemoryStockCurrentRepository {
    async fn find_by_id(&self, id: &StockCurrentId) -> AppResult<Option<StockCurrent>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn save(&self, entity: &StockCurrent) -> AppResult<StockCurrent> {
        let mut rows = self.rows.write().await;

        if let Some(product_id) = entity.product_id {
            let taken = rows
                .values()
                .any(|r| r.product_id == Some(product_id) && r.id != entity.id);
            if taken {
                return Err(InventoryError::ProductAlreadyAssigned(product_id).into());
            }
        }

        let id = match entity.id {
            Some(id) if rows.contains_key(&id) => id,
            Some(id) => return Err(InventoryError::StockCurrentNotFound(id).into()),
            None => StockCurrentId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };

        let saved = StockCurrent {
            id: Some(id),
            ..entity.clone()
        };
        rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: &StockCurrentId) -> AppResult<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &StockCurrentId) -> AppResult<bool> {
        Ok(self.rows.read().await.contains_key(id))
    }
}

#[async_trait]
impl PageableRepository<StockCurrent, StockCurrentId> for InMemoryStockCurrentRepository {
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<StockCurrent>> {
        let mut items: Vec<StockCurrent> = self.rows.read().await.values().cloned().collect();
        items.sort_by(|a, b| compare_by_sort(&pagination.sort, a, b));
        Ok(page_of(items, pagination))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.rows.read().await.len() as u64)
    }
}

#[async_trait]
impl StockCurrentRepository for InMemoryStockCurrentRepository {
    async fn find_all_unpaged(&self) -> AppResult<Vec<StockCurrent>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_product_id(&self, product_id: ProductId) -> AppResult<Option<StockCurrent>> {
        let rows = self.rows.read().await;
        let mut matches = rows.values().filter(|r| r.product_id == Some(product_id));
        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(InventoryError::AmbiguousProduct(product_id).into());
        }
        Ok(first)
    }

    async fn find_all_where_product_is_null(&self) -> AppResult<Vec<StockCurrent>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.product_id.is_none())
            .cloned()
            .collect())
    }
}

/// 内存状态仓储
pub struct InMemoryStatusRepository {
    rows: RwLock<BTreeMap<StatusId, Status>>,
    next_id: AtomicI64,
}

impl InMemoryStatusRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStatusRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Status, StatusId> for InMemoryStatusRepository {
    async fn find_by_id(&self, id: &StatusId) -> AppResult<Option<Status>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn save(&self, entity: &Status) -> AppResult<Status> {
        let mut rows = self.rows.write().await;
        let id = match entity.id {
            Some(id) if rows.contains_key(&id) => id,
            Some(id) => return Err(InventoryError::StatusNotFound(id).into()),
            None => StatusId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };

        let saved = Status {
            id: Some(id),
            name: entity.name.clone(),
        };
        rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: &StatusId) -> AppResult<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &StatusId) -> AppResult<bool> {
        Ok(self.rows.read().await.contains_key(id))
    }
}

#[async_trait]
impl PageableRepository<Status, StatusId> for InMemoryStatusRepository {
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<Status>> {
        let mut items: Vec<Status> = self.rows.read().await.values().cloned().collect();
        if let Some(order) = pagination.sort.iter().find(|o| o.property == "name") {
            items.sort_by(|a, b| a.name.cmp(&b.name));
            if order.direction == inv_common::SortDirection::Desc {
                items.reverse();
            }
        } else if pagination
            .sort
            .iter()
            .any(|o| o.property == "id" && o.direction == inv_common::SortDirection::Desc)
        {
            items.reverse();
        }
        Ok(page_of(items, pagination))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.rows.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inv_common::SortOrder;
    use inv_errors::AppError;

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let repo = InMemoryStockCurrentRepository::new();
        let a = repo.save(&StockCurrent::new()).await.unwrap();
        let b = repo.save(&StockCurrent::new()).await.unwrap();

        assert_eq!(a.id, Some(StockCurrentId(1)));
        assert_eq!(b.id, Some(StockCurrentId(2)));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let repo = InMemoryStockCurrentRepository::new();
        let missing = StockCurrent {
            id: Some(StockCurrentId(99)),
            ..Default::default()
        };
        assert!(matches!(
            repo.save(&missing).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_product_id_is_unique() {
        let repo = InMemoryStockCurrentRepository::new();
        let first = repo
            .save(&StockCurrent::new().with_product(ProductId(5)))
            .await
            .unwrap();

        let duplicate = repo.save(&StockCurrent::new().with_product(ProductId(5))).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        // 更新自身不冲突
        let updated = repo.save(&first.clone().with_sell_price(2.0)).await.unwrap();
        assert_eq!(updated.sell_price, Some(2.0));
    }

    #[tokio::test]
    async fn test_find_all_pages_and_sorts() {
        let repo = InMemoryStockCurrentRepository::new();
        for quantity in [5.0, 1.0, 3.0] {
            repo.save(&StockCurrent::new().with_quantity(quantity, "kg"))
                .await
                .unwrap();
        }

        let pagination = Pagination::new(1, 2).with_sort(SortOrder::asc("quantity"));
        let page = repo.find_all(&pagination).await.unwrap();
        let quantities: Vec<f64> = page.items.iter().filter_map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![1.0, 3.0]);
        assert_eq!(page.total, 3);

        let page = repo.find_all(&Pagination::new(3, 2)).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_product_lookups() {
        let repo = InMemoryStockCurrentRepository::new();
        let linked = repo
            .save(&StockCurrent::new().with_product(ProductId(4)))
            .await
            .unwrap();
        let orphan = repo.save(&StockCurrent::new()).await.unwrap();

        let found = repo.find_by_product_id(ProductId(4)).await.unwrap();
        assert_eq!(found, Some(linked));
        assert!(repo.find_by_product_id(ProductId(5)).await.unwrap().is_none());

        let orphans = repo.find_all_where_product_is_null().await.unwrap();
        assert_eq!(orphans, vec![orphan]);
        assert_eq!(repo.find_all_unpaged().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_crud() {
        let repo = InMemoryStatusRepository::new();
        let saved = repo.save(&Status::named("OPEN")).await.unwrap();
        let id = saved.id.unwrap();

        assert!(repo.exists(&id).await.unwrap());
        repo.delete(&id).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
