//! 分页、排序和检索参数
//!
//! `sort` 可以重复出现（`sort=quantity,desc&sort=id`），所以直接解析原始查询串

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use inv_common::{Pagination, SortOrder};

use super::ApiError;

/// 列表类请求的查询参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub pagination: Pagination,
    pub query: Option<String>,
    pub filter: Option<String>,
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut page = 1u32;
        let mut size = Pagination::DEFAULT_PAGE_SIZE;
        let mut sort = Vec::new();
        let mut query = None;
        let mut filter = None;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "page" => {
                    page = value
                        .parse()
                        .map_err(|_| ApiError::bad_request(format!("Invalid page: {}", value)))?;
                }
                "size" => {
                    size = value
                        .parse()
                        .map_err(|_| ApiError::bad_request(format!("Invalid size: {}", value)))?;
                }
                "sort" => {
                    let order = SortOrder::parse(&value)
                        .ok_or_else(|| ApiError::bad_request(format!("Invalid sort: {}", value)))?;
                    sort.push(order);
                }
                "query" => query = Some(value.into_owned()),
                "filter" => filter = Some(value.into_owned()),
                _ => {}
            }
        }

        let mut pagination = Pagination::new(page, size);
        pagination.sort = sort;
        Ok(Self {
            pagination,
            query,
            filter,
        })
    }
}

impl<S> FromRequestParts<S> for PageRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query())
    }
}

/// 路径中的数字 ID，格式错误时按 problem+json 返回 400
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl IdPath {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        raw.parse()
            .map(Self)
            .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
    }
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Self::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::parse(None).unwrap();
        assert_eq!(request.pagination, Pagination::default());
        assert!(request.query.is_none());
    }

    #[test]
    fn test_repeated_sort_and_query() {
        let request =
            PageRequest::parse(Some("page=2&size=5&sort=quantity,desc&sort=id&query=units%3Akg"))
                .unwrap();

        assert_eq!(request.pagination.page, 2);
        assert_eq!(request.pagination.page_size, 5);
        assert_eq!(
            request.pagination.sort,
            vec![SortOrder::desc("quantity"), SortOrder::asc("id")]
        );
        assert_eq!(request.query.as_deref(), Some("units:kg"));
    }

    #[test]
    fn test_size_is_capped() {
        let request = PageRequest::parse(Some("size=100000")).unwrap();
        assert_eq!(request.pagination.page_size, Pagination::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PageRequest::parse(Some("page=abc")).is_err());
        assert!(PageRequest::parse(Some("sort=id,sideways")).is_err());
    }

    #[test]
    fn test_id_path() {
        assert_eq!(IdPath::parse("42").unwrap(), IdPath(42));
        assert!(IdPath::parse("abc").is_err());
        assert!(IdPath::parse("1.5").is_err());
    }
}
