// ================
// common/src/lib.rs
// ================
//! Shared types crossing the presentation boundary.
//!
//! The UI layer calls into the core with plain strings and gets these
//! structures back; nothing here knows how a view is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Authorization label attached to a user.
///
/// Closed set on purpose: a role outside this enum can only enter the
/// system through legacy rows already on disk, and such rows route the
/// session to the error view rather than panicking a lookup.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

impl Role {
    /// All roles an admin may assign.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Analyst, Role::Viewer];

    /// The on-disk spelling of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Analyst => "analyst",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted role string is outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised role '{0}'")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            "viewer" => Ok(Role::Viewer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// The screen the UI should render for the current session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Login form; the only view for an unauthenticated session.
    Login,
    /// User management: register, list, change roles and passwords.
    AdminDashboard,
    /// Self-service password change.
    PasswordChange,
    /// Analytics landing page. Defined but never dispatched: analysts
    /// currently land on `PasswordChange`, matching the system this
    /// replaces. Routing analysts here is a behaviour change that needs
    /// an explicit decision, not a silent fix.
    Analytics,
    /// Terminal display-only state for a session whose persisted role is
    /// outside the known set; only logout is permitted.
    UnknownRoleError,
}

/// One row of the admin user listing.
///
/// `role` carries the raw persisted string so legacy values display
/// as-is instead of being dropped from the listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub role: String,
}

/// Result of a login attempt, as rendered by the UI.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub success: bool,
    /// `None` on failure, and also when the stored role is unknown.
    pub role: Option<Role>,
    pub message: String,
}

impl LoginResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            role: None,
            message: message.into(),
        }
    }
}

/// Result of any other user-visible operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpResponse {
    pub success: bool,
    pub message: String,
}

impl OpResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
