//! Error mapping for the Elasticsearch adapter

use inv_errors::AppError;
use reqwest::StatusCode;

/// Convert an Elasticsearch error response to AppError
pub fn map_status_error(status: StatusCode, body: &str, context: &str) -> AppError {
    let reason = error_reason(body).unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::NOT_FOUND => AppError::not_found(format!("{}: {}", context, reason)),
        StatusCode::CONFLICT => AppError::conflict(format!("{}: {}", context, reason)),
        StatusCode::BAD_REQUEST => AppError::validation(format!("{}: {}", context, reason)),
        // Auth failures, throttling and cluster errors are all outside our control
        _ => AppError::external_service(format!("{} ({}): {}", context, status.as_u16(), reason)),
    }
}

/// Convert a transport-level error (connect, timeout, decode) to AppError
pub fn map_transport_error(err: reqwest::Error, context: &str) -> AppError {
    if err.is_timeout() {
        AppError::external_service(format!("{}: request timed out", context))
    } else if err.is_decode() {
        AppError::internal(format!("{}: invalid response body: {}", context, err))
    } else {
        AppError::external_service(format!("{}: {}", context, err))
    }
}

/// Pull `error.reason` out of an Elasticsearch error body
fn error_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    match error.get("reason").and_then(|r| r.as_str()) {
        Some(reason) => Some(reason.to_string()),
        None => error.as_str().map(str::to_string),
    }
}
