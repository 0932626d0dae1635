use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenant_vault_core::SecretData;

use crate::{
    error::ApiError,
    extractors::{AuthenticatedUser, JsonBody},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSecretRequest {
    #[serde(rename = "secret-name")]
    pub secret_name: String,
    #[serde(default)]
    pub data: SecretData,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSecretRequest {
    #[serde(default)]
    pub data: SecretData,
}

#[derive(Debug, Serialize)]
pub struct SecretResponse {
    #[serde(rename = "secret-name")]
    pub secret_name: String,
    pub data: SecretData,
}

#[derive(Debug, Serialize)]
pub struct SecretListResponse {
    pub secrets: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /secrets
pub async fn create_secret(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateSecretRequest>,
) -> Result<(StatusCode, Json<SecretResponse>), ApiError> {
    state
        .vault
        .put_secret(&auth.identity, &req.secret_name, req.data.clone())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SecretResponse {
            secret_name: req.secret_name,
            data: req.data,
        }),
    ))
}

/// GET /secrets
pub async fn list_secrets(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<Json<SecretListResponse>, ApiError> {
    let secrets = state.vault.list_secrets(&auth.identity).await?;
    Ok(Json(SecretListResponse { secrets }))
}

/// GET /secrets/:name
pub async fn get_secret(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
    let data = state.vault.get_secret(&auth.identity, &name).await?;
    Ok(Json(SecretResponse {
        secret_name: name,
        data,
    }))
}

/// PUT /secrets/:name
/// Replaces the secret's data entirely
pub async fn update_secret(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(name): Path<String>,
    JsonBody(req): JsonBody<UpdateSecretRequest>,
) -> Result<Json<SecretResponse>, ApiError> {
    state
        .vault
        .update_secret(&auth.identity, &name, req.data.clone())
        .await?;

    Ok(Json(SecretResponse {
        secret_name: name,
        data: req.data,
    }))
}

/// DELETE /secrets/:name
pub async fn delete_secret(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.vault.delete_secret(&auth.identity, &name).await?;

    Ok(StatusCode::NO_CONTENT)
}
