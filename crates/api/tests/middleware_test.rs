use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use folio_api::middleware::error_handling::AppError;
use folio_core::errors::FolioError;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(FolioError::AuthenticationRequired("Invalid token".into()), StatusCode::UNAUTHORIZED)]
#[case(FolioError::InvalidCredentials, StatusCode::UNAUTHORIZED)]
#[case(FolioError::AccountLocked { minutes: 3 }, StatusCode::LOCKED)]
#[case(FolioError::AuthorizationDenied("Admin role required".into()), StatusCode::FORBIDDEN)]
#[case(FolioError::AlreadyExists("alice".into()), StatusCode::CONFLICT)]
#[case(FolioError::Validation("too short".into()), StatusCode::BAD_REQUEST)]
#[case(FolioError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] err: FolioError, #[case] expected: StatusCode) {
    assert_eq!(AppError(err).status(), expected);
}

#[test]
fn test_locked_response_carries_retry_after() {
    let response = AppError(FolioError::AccountLocked { minutes: 3 }).into_response();

    assert_eq!(response.status(), StatusCode::LOCKED);
    assert_eq!(response.headers()[header::RETRY_AFTER], "180");
}

#[test]
fn test_other_errors_have_no_retry_after() {
    let response = AppError(FolioError::InvalidCredentials).into_response();

    assert!(response.headers().get(header::RETRY_AFTER).is_none());
}
