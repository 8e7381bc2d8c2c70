//! Repository trait 定义

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination};
use inv_errors::AppResult;

/// 基础 Repository trait
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// 根据 ID 查找，不存在时返回 None
    async fn find_by_id(&self, id: &ID) -> AppResult<Option<T>>;

    /// 保存实体（无 ID 时插入，有 ID 时更新），返回持久化后的实体
    async fn save(&self, entity: &T) -> AppResult<T>;

    /// 删除实体，ID 不存在时不报错
    async fn delete(&self, id: &ID) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, id: &ID) -> AppResult<bool>;
}

/// 支持分页查询的 Repository
#[async_trait]
pub trait PageableRepository<T, ID>: Repository<T, ID> {
    /// 分页查询所有
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<T>>;

    /// 统计总数
    async fn count(&self) -> AppResult<u64>;
}
