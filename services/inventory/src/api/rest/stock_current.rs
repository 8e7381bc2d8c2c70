//! 当前库存接口

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::application::RequestContext;
use crate::application::dto::{ReconcileReportDto, ReindexResultDto, StockCurrentDto};
use crate::domain::stock_current::{ProductId, StockCurrentId};
use crate::error::InventoryError;

use super::{ApiError, AppState, IdPath, PageRequest};

const BASE_PATH: &str = "/api/stock-currents";
const FILTER_PRODUCT_IS_NULL: &str = "product-is-null";

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

fn total_count_headers(total: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    headers
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(dto): Json<StockCurrentDto>,
) -> Result<Response, ApiError> {
    if dto.id.is_some() {
        return Err(InventoryError::IdAlreadyPresent("stockCurrent").into());
    }

    let saved = state.stock_currents.save(&ctx, dto).await?;
    let location = saved
        .id
        .map(|id| format!("{}/{}", BASE_PATH, id))
        .unwrap_or_else(|| BASE_PATH.to_string());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(saved),
    )
        .into_response())
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(dto): Json<StockCurrentDto>,
) -> Result<Json<StockCurrentDto>, ApiError> {
    if dto.id.is_none() {
        return Err(InventoryError::IdMissing("stockCurrent").into());
    }

    Ok(Json(state.stock_currents.save(&ctx, dto).await?))
}

/// 分页列表；`filter=product-is-null` 时返回所有未关联产品的记录
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    request: PageRequest,
) -> Result<Response, ApiError> {
    match request.filter.as_deref() {
        Some(FILTER_PRODUCT_IS_NULL) => {
            let items = state
                .stock_currents
                .find_all_where_product_is_null(&ctx)
                .await?;
            Ok(Json(items).into_response())
        }
        Some(other) => Err(InventoryError::UnknownFilter(other.to_string()).into()),
        None => {
            let page = state
                .stock_currents
                .find_all(&ctx, &request.pagination)
                .await?;
            Ok((total_count_headers(page.total), Json(page.items)).into_response())
        }
    }
}

pub async fn get_one(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> Result<Json<StockCurrentDto>, ApiError> {
    state
        .stock_currents
        .find_one(&ctx, StockCurrentId(id))
        .await?
        .map(Json)
        .ok_or_else(|| InventoryError::StockCurrentNotFound(StockCurrentId(id)).into())
}

pub async fn get_by_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdPath(product_id): IdPath,
) -> Result<Json<StockCurrentDto>, ApiError> {
    state
        .stock_currents
        .find_by_product_id(&ctx, ProductId(product_id))
        .await?
        .map(Json)
        .ok_or_else(|| InventoryError::NoStockCurrentForProduct(ProductId(product_id)).into())
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .stock_currents
        .delete(&ctx, StockCurrentId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    request: PageRequest,
) -> Result<Response, ApiError> {
    let query = request.query.unwrap_or_default();
    let page = state
        .stock_currents
        .search(&ctx, &query, &request.pagination)
        .await?;
    Ok((total_count_headers(page.total), Json(page.items)).into_response())
}

pub async fn reindex(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ReindexResultDto>, ApiError> {
    let indexed = state.stock_currents.reindex(&ctx).await?;
    Ok(Json(ReindexResultDto { indexed }))
}

pub async fn reconcile(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ReconcileReportDto>, ApiError> {
    let report = state.stock_currents.reconcile(&ctx).await?;
    Ok(Json(report.into()))
}

/// 尚未同步到索引的 ID
pub async fn pending(State(state): State<AppState>) -> Json<Vec<i64>> {
    let ids = state.stock_currents.pending_divergences().await;
    Json(ids.into_iter().map(|id| id.0).collect())
}
