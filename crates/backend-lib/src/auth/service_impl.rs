use std::sync::{Arc, LazyLock};

use dashgate_common::Role;
use tracing::{debug, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::service::{AuthGrant, AuthService};
use crate::error::AppError;
use crate::store::CredentialStore;

// Verified against when the username does not exist, so the unknown-user
// path costs a real scrypt verification just like the wrong-password path.
static DECOY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("decoy-password").unwrap_or_default());

/// Default [`AuthService`] backed by a [`CredentialStore`].
pub struct DefaultAuth {
    store: Arc<dyn CredentialStore>,
}

impl DefaultAuth {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl AuthService for DefaultAuth {
    fn authenticate(&self, username: &str, password: &str) -> Result<AuthGrant, AppError> {
        let record = match self.store.find(username)? {
            Some(record) => record,
            None => {
                verify_password(&DECOY_HASH, password);
                return Err(AppError::InvalidCredentials);
            },
        };

        if !verify_password(&record.password_hash, password) {
            debug!(username, "password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        let role = match record.role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                warn!(username, role = %record.role, "stored role is outside the known set");
                None
            },
        };

        Ok(AuthGrant {
            username: record.username,
            role,
        })
    }

    fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let record = self
            .store
            .find(username)?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&record.password_hash, old_password) {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash =
            hash_password(new_password).map_err(|e| AppError::Internal(e.to_string()))?;
        // Single UPDATE: concurrent readers see either the old or the
        // new hash, never a partial write.
        self.store.update_password_hash(username, &new_hash)?;
        debug!(username, "password changed");
        Ok(())
    }

    fn register(&self, username: &str, password: &str, role: Role) -> Result<(), AppError> {
        let hash = hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;
        self.store.register(username, &hash, role)?;
        debug!(username, %role, "user registered");
        Ok(())
    }
}
