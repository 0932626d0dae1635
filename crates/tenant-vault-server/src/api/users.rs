use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::{AuthenticatedUser, JsonBody},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    pub message: String,
}

impl UserResponse {
    fn message(message: &str) -> Self {
        Self {
            token: None,
            expires_at: None,
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    tracing::info!(identity = %req.username, "Registering identity");

    state.vault.register(&req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::message("user registered successfully")),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let issued = state
        .vault
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(UserResponse {
        token: Some(issued.token),
        expires_at: Some(issued.expires_at),
        message: "login successful".to_string(),
    }))
}

/// PUT /user/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state
        .vault
        .change_secret(&auth.identity, &req.new_password)
        .await?;

    Ok(Json(UserResponse::message("password changed successfully")))
}

/// DELETE /user/delete
/// Removes the caller's scope together with every secret in it
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    tracing::info!(identity = %auth.identity, "Deleting identity");

    state.vault.delete_identity(&auth.identity).await?;

    Ok(Json(UserResponse::message("user deleted successfully")))
}
