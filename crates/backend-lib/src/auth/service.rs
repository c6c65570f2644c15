use dashgate_common::Role;

use crate::error::AppError;

/// What a successful login establishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub username: String,
    /// `None` when the persisted role string is outside the known set
    /// (legacy rows); the session then lands on the error view.
    pub role: Option<Role>,
}

/// Credential verification and mutation, always against the store.
///
/// No caching: every call re-reads persisted state, so role and
/// password changes take effect at the next login without a restart.
pub trait AuthService: Send + Sync {
    /// Verify a credential pair. Unknown user and wrong password both
    /// return [`AppError::InvalidCredentials`].
    fn authenticate(&self, username: &str, password: &str) -> Result<AuthGrant, AppError>;

    /// Replace a user's password after verifying the old one. Absent
    /// user and failed verification both return
    /// [`AppError::InvalidCredentials`].
    fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError>;

    /// Hash and persist a new user. Role restrictions are the access
    /// controller's job, not this trait's.
    fn register(&self, username: &str, password: &str, role: Role) -> Result<(), AppError>;
}
