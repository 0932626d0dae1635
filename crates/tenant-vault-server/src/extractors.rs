use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use tenant_vault_sessions::VerifiedIdentity;

use crate::{error::ApiError, request_context};

/// Extractor for authenticated requests
///
/// Reads the identity the auth middleware attached. A route that is not
/// behind the middleware never has one, and is rejected as unauthenticated.
pub struct AuthenticatedUser {
    pub identity: VerifiedIdentity,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = request_context::read(&parts.extensions)
            .cloned()
            .ok_or_else(ApiError::missing_credentials)?;

        Ok(AuthenticatedUser { identity })
    }
}

/// JSON request body whose rejections use the API error shape
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}
