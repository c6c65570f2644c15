// ============================
// crates/backend-lib/src/error.rs
// ============================
//! Central error type for the auth core.
use thiserror::Error;

/// Application error types with error codes and user-facing messages.
///
/// Every domain variant is recoverable: it comes back to the UI as a
/// message and the user resubmits the form. Only storage failures at
/// startup are fatal, and those are propagated by the binary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown user or wrong password. Deliberately one variant: the
    /// caller must not be able to tell which of the two happened.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("New password and confirmation do not match")]
    PasswordMismatch,

    #[error("Unrecognised role '{0}'")]
    UnknownRole(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dashgate_common::RoleParseError> for AppError {
    fn from(err: dashgate_common::RoleParseError) -> Self {
        AppError::UnknownRole(err.0)
    }
}

impl AppError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "AUTH_001",
            AppError::DuplicateUser(_) => "USER_001",
            AppError::UserNotFound(_) => "USER_002",
            AppError::PasswordMismatch => "AUTH_002",
            AppError::UnknownRole(_) => "ROLE_001",
            AppError::Forbidden(_) => "AUTH_003",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Internal(_) => "INT_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Io(_) => "IO_001",
        }
    }

    /// Get a sanitized message suitable for rendering in the UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid username or password".to_string(),
            AppError::DuplicateUser(name) => format!("User '{name}' already exists"),
            AppError::UserNotFound(name) => format!("User '{name}' not found"),
            AppError::PasswordMismatch => {
                "New password and confirmation do not match".to_string()
            },
            AppError::UnknownRole(_) => {
                "Your account has an unrecognised role; contact an administrator".to_string()
            },
            AppError::Forbidden(reason) => format!("Not permitted: {reason}"),
            AppError::InvalidInput(reason) => format!("Invalid input: {reason}"),
            AppError::Internal(_) | AppError::Storage(_) | AppError::Io(_) => {
                "An internal error occurred".to_string()
            },
        }
    }
}
