//! 库存仓储接口

use async_trait::async_trait;
use inv_errors::AppResult;
use inv_ports::{PageableRepository, SearchRepository};

use super::{ProductId, StockCurrent, StockCurrentId};

/// 主库仓储
#[async_trait]
pub trait StockCurrentRepository: PageableRepository<StockCurrent, StockCurrentId> {
    /// 不分页查询所有记录
    async fn find_all_unpaged(&self) -> AppResult<Vec<StockCurrent>>;

    /// 按产品查找，多于一条记录时返回 DataIntegrity 错误
    async fn find_by_product_id(&self, product_id: ProductId) -> AppResult<Option<StockCurrent>>;

    /// 查询未关联产品的记录
    async fn find_all_where_product_is_null(&self) -> AppResult<Vec<StockCurrent>>;
}

/// 搜索索引
pub trait StockCurrentSearchRepository: SearchRepository<StockCurrent, StockCurrentId> {}

impl<T> StockCurrentSearchRepository for T where T: SearchRepository<StockCurrent, StockCurrentId> {}
