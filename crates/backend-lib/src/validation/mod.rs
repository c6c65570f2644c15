// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Form-input validation at the presentation edge.
//!
//! Shape checks only. Password strength is deliberately not policed
//! here, matching the system this replaces.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::AppError;

const MAX_USERNAME_LENGTH: usize = 64;
const MAX_PASSWORD_LENGTH: usize = 128;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("New password and confirmation do not match")]
    ConfirmationMismatch,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ConfirmationMismatch => AppError::PasswordMismatch,
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "username must not be empty".to_string(),
        ));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "username may contain only letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(username)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "password must not be empty".to_string(),
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(password)
}

/// Check the new-password / confirmation pair before the service runs.
pub fn validate_confirmation(new_password: &str, confirm: &str) -> ValidationResult<()> {
    if new_password != confirm {
        return Err(ValidationError::ConfirmationMismatch);
    }
    Ok(())
}
