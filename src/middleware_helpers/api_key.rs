use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::errors::ServiceError;
use crate::webhooks::constant_time_eq;

/// Header carrying the catalog admin key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Guards mutating requests when an admin key is configured. Reads pass through.
pub async fn require_admin_api_key(
    State(expected): State<Option<Arc<str>>>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let Some(expected) = expected else {
        return Ok(next.run(request).await);
    };
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !constant_time_eq(provided, &expected) {
        warn!(method = %request.method(), uri = %request.uri(), "rejected catalog mutation without valid api key");
        return Err(ServiceError::Unauthorized("missing or invalid API key".into()));
    }
    Ok(next.run(request).await)
}
