//! Input validation for account provisioning.
//!
//! Every function returns the normalized value on success so callers store
//! exactly what was checked.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{FolioError, FolioResult};

pub const USERNAME_MAX_LENGTH: usize = 50;
/// RFC 5321 limit.
pub const EMAIL_MAX_LENGTH: usize = 320;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

lazy_static! {
    /// `local@domain.tld`, no whitespace, exactly one `@`
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Trims the handle and checks it is non-empty and within the length limit.
pub fn validate_username(name: &str) -> FolioResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(FolioError::Validation("Username cannot be empty".to_string()));
    }

    let length = trimmed.chars().count();
    if length > USERNAME_MAX_LENGTH {
        return Err(FolioError::Validation(format!(
            "Username must be {} characters or less (got {})",
            USERNAME_MAX_LENGTH, length
        )));
    }

    Ok(trimmed.to_string())
}

/// Trims and lower-cases the address before checking its shape.
pub fn validate_email(email: &str) -> FolioResult<String> {
    let normalized = email.trim().to_lowercase();

    if normalized.chars().count() > EMAIL_MAX_LENGTH {
        return Err(FolioError::Validation(format!(
            "Email too long (max {} characters)",
            EMAIL_MAX_LENGTH
        )));
    }

    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(FolioError::Validation("Invalid email format".to_string()));
    }

    Ok(normalized)
}

/// Length bounds only. The password is never trimmed or transformed.
pub fn validate_password(password: &str) -> FolioResult<()> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(FolioError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(FolioError::Validation(format!(
            "Password must be {} characters or less",
            PASSWORD_MAX_LENGTH
        )));
    }

    Ok(())
}
