//! 通用类型定义

use serde::{Deserialize, Serialize};

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 单个排序条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }

    /// 解析 `property[,asc|desc]` 形式的排序表达式
    ///
    /// 属性为空或方向无法识别时返回 None
    pub fn parse(expr: &str) -> Option<Self> {
        let mut parts = expr.splitn(2, ',');
        let property = parts.next()?.trim();
        if property.is_empty() {
            return None;
        }

        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d.is_empty() || d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(_) => return None,
        };

        Some(Self {
            property: property.to_string(),
            direction,
        })
    }
}

/// 分页参数
///
/// `page` 从 1 开始，0 按第 1 页处理
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub sort: Vec<SortOrder>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 1000;

    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
            sort: Vec::new(),
        }
    }

    /// 追加排序条件
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }

    pub fn empty(pagination: &Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 转换每一项，保留分页信息
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        assert_eq!(Pagination::new(1, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
        // page 0 按第 1 页处理
        assert_eq!(Pagination::new(0, 10).offset(), 0);
    }

    #[test]
    fn test_pagination_clamps_page_size() {
        assert_eq!(Pagination::new(1, 0).page_size, 1);
        assert_eq!(Pagination::new(1, 50_000).page_size, Pagination::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("id"), Some(SortOrder::asc("id")));
        assert_eq!(SortOrder::parse("quantity,desc"), Some(SortOrder::desc("quantity")));
        assert_eq!(SortOrder::parse("units, ASC"), Some(SortOrder::asc("units")));
        assert_eq!(SortOrder::parse(",desc"), None);
        assert_eq!(SortOrder::parse("id,sideways"), None);
    }

    #[test]
    fn test_paged_result() {
        let pagination = Pagination::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 23, &pagination);
        assert_eq!(result.total_pages(), 3);

        let mapped = result.map(|v| v * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.page, 2);
        assert_eq!(mapped.total, 23);

        let empty: PagedResult<i32> = PagedResult::empty(&pagination);
        assert!(empty.is_empty());
        assert_eq!(empty.total_pages(), 0);
    }
}
