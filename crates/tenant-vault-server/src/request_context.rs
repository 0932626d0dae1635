//! Per-request identity context.
//!
//! The verified identity of a request travels in the request's own
//! extensions, so it is dropped with the request and never shared.

use axum::http::{header::AUTHORIZATION, Extensions, HeaderMap};
use tenant_vault_sessions::VerifiedIdentity;

/// Attach the identity proven by this request's token
pub fn attach(extensions: &mut Extensions, identity: VerifiedIdentity) {
    extensions.insert(identity);
}

/// Identity attached earlier in the request, if any
pub fn read(extensions: &Extensions) -> Option<&VerifiedIdentity> {
    extensions.get::<VerifiedIdentity>()
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
