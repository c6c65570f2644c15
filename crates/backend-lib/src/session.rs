// ============================
// crates/backend-lib/src/session.rs
// ============================
//! Per-connection session state.
use std::collections::HashMap;

use dashgate_common::Role;
use parking_lot::RwLock;
use uuid::Uuid;

/// Opaque handle addressing one UI connection's session.
pub type SessionId = Uuid;

/// Mutable per-connection state. Never persisted; a process restart
/// logs everyone out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    /// Empty while logged out.
    pub username: String,
    /// `None` while logged out, and also while logged in with a
    /// persisted role outside the known set.
    pub role: Option<Role>,
}

impl Session {
    /// Whether this session may act as an administrator.
    pub fn is_admin(&self) -> bool {
        self.logged_in && self.role == Some(Role::Admin)
    }
}

/// Owns every live session, keyed by handle.
///
/// No TTL and no cleanup task: a session lives exactly as long as its
/// UI connection, which closes it explicitly.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logged-out session for a new connection.
    pub fn open(&self) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions.write().insert(id, Session::default());
        id
    }

    /// Snapshot of a session, if the handle is live.
    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().get(&id).cloned()
    }

    /// Mark a session as authenticated. Returns `false` for a dead handle.
    pub fn login(&self, id: SessionId, username: &str, role: Option<Role>) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&id) {
            Some(session) => {
                session.logged_in = true;
                session.username = username.to_string();
                session.role = role;
                true
            },
            None => false,
        }
    }

    /// Reset a session to logged-out defaults, clearing username and role.
    pub fn logout(&self, id: SessionId) {
        if let Some(session) = self.sessions.write().get_mut(&id) {
            *session = Session::default();
        }
    }

    /// Drop a session at connection close.
    pub fn close(&self, id: SessionId) {
        self.sessions.write().remove(&id);
    }
}
