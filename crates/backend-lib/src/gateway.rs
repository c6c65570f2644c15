// ============================
// crates/backend-lib/src/gateway.rs
// ============================
//! The presentation boundary: every call a UI layer may make.
//!
//! The UI owns rendering and transport; it hands each request to one of
//! these methods together with the session handle of the connection it
//! came in on, and renders the response structures from
//! `dashgate-common`. Domain errors never escape as `Err` from the
//! form-shaped calls; they come back as `success = false` plus a
//! sanitized message, ready to display.

use std::sync::Arc;

use dashgate_common::{LoginResponse, OpResponse, Role, UserSummary, View};
use tracing::info;

use crate::access::AccessController;
use crate::auth::AuthService;
use crate::error::AppError;
use crate::session::{Session, SessionId, SessionManager};
use crate::store::CredentialStore;
use crate::validation;

/// In-process API handed to the UI layer.
pub struct Gateway {
    auth: Arc<dyn AuthService>,
    sessions: Arc<SessionManager>,
    access: AccessController,
}

impl Gateway {
    pub fn new(
        auth: Arc<dyn AuthService>,
        sessions: Arc<SessionManager>,
        access: AccessController,
    ) -> Self {
        Self {
            auth,
            sessions,
            access,
        }
    }

    /// Open a session for a new UI connection.
    pub fn open_session(&self) -> SessionId {
        self.sessions.open()
    }

    /// Drop a session at connection close.
    pub fn close_session(&self, session: SessionId) {
        self.sessions.close(session);
    }

    fn session(&self, id: SessionId) -> Result<Session, AppError> {
        self.sessions
            .get(id)
            .ok_or_else(|| AppError::Internal("unknown session handle".to_string()))
    }

    /// Attempt a login on the given session.
    pub fn login(&self, session: SessionId, username: &str, password: &str) -> LoginResponse {
        if self.sessions.get(session).is_none() {
            return LoginResponse::rejected("Session expired; reconnect and try again");
        }
        match self.auth.authenticate(username, password) {
            Ok(grant) => {
                self.sessions.login(session, &grant.username, grant.role);
                info!(username = %grant.username, "login succeeded");
                LoginResponse {
                    success: true,
                    role: grant.role,
                    message: format!("Welcome, {}!", grant.username),
                }
            },
            Err(err) => LoginResponse::rejected(err.user_message()),
        }
    }

    /// Log the session out, clearing username and role.
    pub fn logout(&self, session: SessionId) {
        self.sessions.logout(session);
    }

    /// Register a new user. Non-admin callers may only create viewers.
    pub fn register(
        &self,
        session: SessionId,
        username: &str,
        password: &str,
        role: Role,
    ) -> OpResponse {
        let result = self.try_register(session, username, password, role);
        match result {
            Ok(()) => OpResponse::ok(format!("User '{username}' registered")),
            Err(err) => OpResponse::failed(err.user_message()),
        }
    }

    fn try_register(
        &self,
        session: SessionId,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AppError> {
        let actor = self.session(session)?;
        validation::validate_username(username)?;
        validation::validate_password(password)?;
        self.access.authorize_register(&actor, role)?;
        self.auth.register(username, password, role)
    }

    /// Change a user's password after verifying the old one.
    pub fn change_password(
        &self,
        session: SessionId,
        username: &str,
        old_password: &str,
        new_password: &str,
        confirm: &str,
    ) -> OpResponse {
        let result =
            self.try_change_password(session, username, old_password, new_password, confirm);
        match result {
            Ok(()) => OpResponse::ok("Password changed"),
            Err(err) => OpResponse::failed(err.user_message()),
        }
    }

    fn try_change_password(
        &self,
        session: SessionId,
        username: &str,
        old_password: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        let actor = self.session(session)?;
        // Confirm-field check happens before any credential work.
        validation::validate_confirmation(new_password, confirm)?;
        validation::validate_password(new_password)?;
        self.access.authorize_password_change(&actor, username)?;
        self.auth.change_password(username, old_password, new_password)
    }

    /// Change another user's role. Admin only, with lockout guards.
    pub fn update_role(&self, session: SessionId, username: &str, new_role: Role) -> OpResponse {
        let result = self.try_update_role(session, username, new_role);
        match result {
            Ok(()) => OpResponse::ok(format!("Role of '{username}' set to {new_role}")),
            Err(err) => OpResponse::failed(err.user_message()),
        }
    }

    fn try_update_role(
        &self,
        session: SessionId,
        username: &str,
        new_role: Role,
    ) -> Result<(), AppError> {
        let actor = self.session(session)?;
        self.access.authorize_role_update(&actor, username, new_role)?;
        self.access.store().update_role(username, new_role)?;
        info!(username, %new_role, "role updated");
        Ok(())
    }

    /// All users and their roles, for the admin dashboard.
    pub fn list_users(&self, session: SessionId) -> Result<Vec<UserSummary>, AppError> {
        let actor = self.session(session)?;
        self.access.authorize_list(&actor)?;
        self.access.store().list_all()
    }

    /// The view the UI should render for this session right now.
    pub fn view_for(&self, session: SessionId) -> View {
        match self.sessions.get(session) {
            Some(state) => self.access.view_for(&state),
            None => View::Login,
        }
    }
}
