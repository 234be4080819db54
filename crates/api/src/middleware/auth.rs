//! # Authentication Middleware
//!
//! Extractors that read the `Authorization: Bearer <token>` header. Handlers
//! that mutate content take [`AdminSession`] as an argument, which runs the
//! access-control gate before the handler body executes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use folio_core::models::session::AuthenticatedUser;

use crate::{middleware::error_handling::AppError, ApiState};

/// Returns the bearer token from the request headers, if one is present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The bearer token, if the client sent one. Never rejects.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(&parts.headers).map(str::to_string)))
    }
}

/// An authenticated admin. Extraction fails with 401 when the token is
/// missing, unknown or expired and with 403 when the user is not an admin.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers);
        let user = state.auth.require_auth(token).await?;
        Ok(AdminSession(user))
    }
}
