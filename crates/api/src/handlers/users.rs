use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use folio_core::models::user::{CreateUserRequest, CreateUserResponse};

use crate::{
    middleware::{auth::BearerToken, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    BearerToken(token): BearerToken,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let response = state.auth.create_user(payload, token.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
