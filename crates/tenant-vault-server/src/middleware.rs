use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
};
use std::sync::Arc;
use std::time::Instant;
use tenant_vault_core::VaultError;

use crate::{error::ApiError, request_context, state::AppState};

const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID middleware for request tracking and logging
///
/// This middleware:
/// - Generates a unique request ID if not provided
/// - Logs request start and completion with timing
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response<Body> {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Ok(header_value) = request_id.parse() {
        req.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    } else {
        tracing::warn!("Failed to create header value for request ID");
    }

    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown");

    tracing::info!(
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
        user_agent = %user_agent,
        "Request started"
    );

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = elapsed.as_millis(),
        "Request completed"
    );

    response
}

/// Bearer token middleware for protected routes
///
/// Verifies the token and attaches the proven identity to the request, so
/// handlers never see a request whose caller is unknown.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, ApiError> {
    let token = request_context::bearer_token(req.headers())
        .ok_or_else(ApiError::missing_credentials)?
        .to_string();

    let identity = state.vault.verify_token(&token).await.map_err(|e| match e {
        VaultError::Unauthorized(reason) => {
            tracing::debug!("Token rejected: {}", reason);
            ApiError::missing_credentials()
        }
        other => ApiError::from(other),
    })?;

    tracing::debug!(identity = %identity, "Request authenticated");
    request_context::attach(req.extensions_mut(), identity);

    Ok(next.run(req).await)
}
