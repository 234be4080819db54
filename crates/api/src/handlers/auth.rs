use std::sync::Arc;

use axum::{extract::State, Json};
use folio_core::models::session::{
    AuthenticatedUser, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse,
    VerifyTokenRequest, VerifyTokenResponse,
};

use crate::{
    middleware::{auth::AdminSession, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state
        .auth
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn verify_token(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, AppError> {
    let response = state.auth.verify_token(&payload.token).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    let response = state.auth.logout(&payload.token).await?;

    Ok(Json(response))
}

/// Echoes the caller's identity; succeeds only for admins.
pub async fn current_session(AdminSession(user): AdminSession) -> Json<AuthenticatedUser> {
    Json(user)
}
