use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{common::ApiError, server::AppState};

/// True when no password is configured or the `Authorization` header matches it.
pub fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(password) = state.config.server.password.as_deref() else {
        return true;
    };
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|auth| auth == password)
}

pub async fn check_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if authorized(&state, req.headers()) {
        return next.run(req).await;
    }
    // nested routers see the path with the `/v1` prefix stripped
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path())
        .unwrap_or_else(|| req.uri().path());
    warn!("REST authorization failed for {}", path);
    ApiError::unauthorized(path).into_response()
}

pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Radio-Api-Version", HeaderValue::from_static("1"));
    response
}
