// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core auth-gate functionality for the Dashgate dashboard backend.
//!
//! Validates credentials against a SQLite user store, tracks
//! per-connection session state, and gates views and operations by
//! role. The UI layer is an external collaborator that talks to
//! [`gateway::Gateway`].

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod store;
pub mod validation;

use std::sync::Arc;

use crate::access::AccessController;
use crate::auth::{hash_password, AuthService, DefaultAuth};
use crate::config::Settings;
use crate::error::AppError;
use crate::gateway::Gateway;
use crate::session::SessionManager;
use crate::store::CredentialStore;

/// Application state shared across all UI connections.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Credential storage backend
    pub store: Arc<dyn CredentialStore>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create the application state: ensures the schema exists and
    /// seeds the bootstrap admin when no admin is present. A storage
    /// failure here is fatal to startup.
    pub fn new(store: Arc<dyn CredentialStore>, settings: Settings) -> Result<Self, AppError> {
        store.initialize()?;

        let bootstrap_hash = hash_password(&settings.bootstrap.password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        store.bootstrap_admin(&settings.bootstrap.username, &bootstrap_hash)?;

        let auth = Arc::new(DefaultAuth::new(store.clone()));
        Ok(Self {
            auth,
            sessions: Arc::new(SessionManager::new()),
            store,
            settings: Arc::new(settings),
        })
    }

    /// Build the in-process API the UI layer talks to.
    pub fn gateway(&self) -> Gateway {
        Gateway::new(
            self.auth.clone(),
            self.sessions.clone(),
            AccessController::new(self.store.clone()),
        )
    }
}
