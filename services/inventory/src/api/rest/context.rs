//! 从请求头构建 RequestContext

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::application::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PRINCIPAL_HEADER: &str = "x-user-id";

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ctx = match header(REQUEST_ID_HEADER).and_then(|v| Uuid::parse_str(v).ok()) {
            Some(request_id) => RequestContext::new(request_id),
            None => RequestContext::generate(),
        };

        Ok(match header(PRINCIPAL_HEADER) {
            Some(principal) => ctx.with_principal(principal),
            None => ctx,
        })
    }
}
