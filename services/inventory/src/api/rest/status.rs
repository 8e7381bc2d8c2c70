//! 状态接口

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::RequestContext;
use crate::application::dto::StatusDto;
use crate::domain::status::StatusId;
use crate::error::InventoryError;

use super::stock_current::TOTAL_COUNT_HEADER;
use super::{ApiError, AppState, IdPath, PageRequest};

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(dto): Json<StatusDto>,
) -> Result<(StatusCode, Json<StatusDto>), ApiError> {
    if dto.id.is_some() {
        return Err(InventoryError::IdAlreadyPresent("status").into());
    }
    Ok((StatusCode::CREATED, Json(state.statuses.save(&ctx, dto).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(dto): Json<StatusDto>,
) -> Result<Json<StatusDto>, ApiError> {
    if dto.id.is_none() {
        return Err(InventoryError::IdMissing("status").into());
    }
    Ok(Json(state.statuses.save(&ctx, dto).await?))
}

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    request: PageRequest,
) -> Result<Response, ApiError> {
    let page = state.statuses.find_all(&ctx, &request.pagination).await?;
    let mut response = Json(page.items).into_response();
    response
        .headers_mut()
        .insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total));
    Ok(response)
}

pub async fn get_one(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> Result<Json<StatusDto>, ApiError> {
    state
        .statuses
        .find_one(&ctx, StatusId(id))
        .await?
        .map(Json)
        .ok_or_else(|| InventoryError::StatusNotFound(StatusId(id)).into())
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.statuses.delete(&ctx, StatusId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
