//! # Error Handling Middleware
//!
//! Maps [`FolioError`] values to HTTP status codes and JSON error bodies so
//! every endpoint fails the same way. Server-side failures are logged and
//! reported to the client without their internal detail.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use folio_core::errors::FolioError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use folio_api::middleware::error_handling::AppError;
/// use folio_core::errors::FolioError;
///
/// async fn handler(token: Option<String>) -> Result<Json<()>, AppError> {
///     token.ok_or_else(|| {
///         AppError(FolioError::AuthenticationRequired("No token provided".to_string()))
///     })?;
///     Ok(Json(()))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub FolioError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FolioError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            FolioError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            FolioError::AccountLocked { .. } => StatusCode::LOCKED,
            FolioError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            FolioError::AlreadyExists(_) => StatusCode::CONFLICT,
            FolioError::Validation(_) => StatusCode::BAD_REQUEST,
            FolioError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FolioError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = Json(json!({ "error": message }));

        let mut response = (status, body).into_response();
        if let FolioError::AccountLocked { minutes } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&(minutes * 60).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<FolioError> for AppError {
    fn from(err: FolioError) -> Self {
        AppError(err)
    }
}
