use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Authorization required: {0}")]
    AuthorizationDenied(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked. Try again in {minutes} minute(s)")]
    AccountLocked { minutes: i64 },

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type FolioResult<T> = Result<T, FolioError>;
