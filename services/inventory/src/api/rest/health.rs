//! 健康检查与指标导出

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inv_common::check_all;

use super::AppState;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn health(State(state): State<AppState>) -> Response {
    let result = check_all(&state.health_checks, HEALTH_CHECK_TIMEOUT).await;
    let status = if result.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(result)).into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
