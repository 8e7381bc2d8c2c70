//! 搜索索引 trait 定义

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination};
use inv_errors::AppResult;

/// 可写入搜索索引的文档
pub trait Document: Send + Sync {
    /// 文档在索引中的 ID，与主库 ID 一致；尚未持久化时为 None
    fn document_id(&self) -> Option<String>;
}

/// 搜索索引 Repository
///
/// 索引是主库的镜像，只通过 ID 写入和删除
#[async_trait]
pub trait SearchRepository<T, ID>: Send + Sync
where
    T: Document + 'static,
    ID: Send + Sync,
{
    /// 写入或覆盖文档
    async fn index(&self, document: &T) -> AppResult<()>;

    /// 批量写入文档
    async fn index_all(&self, documents: &[T]) -> AppResult<()> {
        for document in documents {
            self.index(document).await?;
        }
        Ok(())
    }

    /// 删除文档，不存在时不报错
    async fn delete(&self, id: &ID) -> AppResult<()>;

    /// 清空索引中的所有文档
    async fn delete_all(&self) -> AppResult<()>;

    /// 按查询字符串全文检索，空白查询匹配所有文档
    async fn search(&self, query: &str, pagination: &Pagination) -> AppResult<PagedResult<T>>;
}
