// ============================
// crates/backend-lib/src/store.rs
// ============================
//! Credential storage with a SQLite implementation.
use std::path::Path;

use dashgate_common::{Role, UserSummary};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::AppError;

/// One persisted user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub username: String,
    pub password_hash: String,
    /// Raw persisted role string; legacy values outside the known set
    /// surface here instead of failing the lookup.
    pub role: String,
}

/// Trait for credential storage backends.
///
/// Uniqueness of usernames is the backend's job (reject on conflict);
/// callers never do an existence check before a write.
pub trait CredentialStore: Send + Sync {
    /// Ensure the schema exists. Idempotent, safe every startup.
    fn initialize(&self) -> Result<(), AppError>;

    /// Insert a new user. Fails with [`AppError::DuplicateUser`] when
    /// the username is taken, leaving no partial state.
    fn register(&self, username: &str, password_hash: &str, role: Role) -> Result<(), AppError>;

    /// Look up one user by username.
    fn find(&self, username: &str) -> Result<Option<StoredUser>, AppError>;

    /// Overwrite an existing user's role.
    /// Fails with [`AppError::UserNotFound`] when the user is absent.
    fn update_role(&self, username: &str, new_role: Role) -> Result<(), AppError>;

    /// Overwrite an existing user's password hash in one statement.
    fn update_password_hash(&self, username: &str, new_hash: &str) -> Result<(), AppError>;

    /// All users, ordered by username.
    fn list_all(&self) -> Result<Vec<UserSummary>, AppError>;

    /// Number of users holding the admin role.
    fn count_admins(&self) -> Result<u64, AppError>;

    /// Create the given admin account if and only if no admin exists.
    /// Returns whether a row was inserted.
    fn bootstrap_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;
}

/// SQLite-backed implementation of [`CredentialStore`].
///
/// The connection sits behind a mutex; every write is a single
/// statement, so concurrent sessions cannot observe partial state.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the credential database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        // WAL mode for concurrent reads + crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and the `check` CLI dry runs.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl CredentialStore for SqliteStore {
    fn initialize(&self) -> Result<(), AppError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                username      TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                role          TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn register(&self, username: &str, password_hash: &str, role: Role) -> Result<(), AppError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role.as_str()],
        );
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateUser(username.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn find(&self, username: &str) -> Result<Option<StoredUser>, AppError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT username, password_hash, role FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(StoredUser {
                        username: row.get(0)?,
                        password_hash: row.get(1)?,
                        role: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn update_role(&self, username: &str, new_role: Role) -> Result<(), AppError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE users SET role = ?2 WHERE username = ?1",
            params![username, new_role.as_str()],
        )?;
        if changed == 0 {
            return Err(AppError::UserNotFound(username.to_string()));
        }
        Ok(())
    }

    fn update_password_hash(&self, username: &str, new_hash: &str) -> Result<(), AppError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE users SET password_hash = ?2 WHERE username = ?1",
            params![username, new_hash],
        )?;
        if changed == 0 {
            return Err(AppError::UserNotFound(username.to_string()));
        }
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<UserSummary>, AppError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT username, role FROM users ORDER BY username")?;
        let rows = stmt.query_map([], |row| {
            Ok(UserSummary {
                username: row.get(0)?,
                role: row.get(1)?,
            })
        })?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn count_admins(&self) -> Result<u64, AppError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn bootstrap_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let conn = self.conn.lock();
        // One statement: the existence check and the insert cannot race
        // with another session's bootstrap.
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, role)
             SELECT ?1, ?2, 'admin'
             WHERE NOT EXISTS (SELECT 1 FROM users WHERE role = 'admin')",
            params![username, password_hash],
        );
        let inserted = match result {
            Ok(n) => n,
            // No admin exists but the bootstrap name is taken by a
            // non-admin row; the operator has to pick another name or
            // promote that account.
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Internal(format!(
                    "bootstrap username '{username}' already exists without the admin role; \
                     configure a different bootstrap username or promote that account"
                )))
            },
            Err(e) => return Err(e.into()),
        };
        if inserted > 0 {
            info!(username, "bootstrapped default admin; change its password");
        }
        Ok(inserted > 0)
    }
}
