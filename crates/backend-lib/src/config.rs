// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Credential database path
    pub db_path: PathBuf,
    /// Log level
    pub log_level: String,
    /// Bootstrap admin credential
    pub bootstrap: BootstrapAdmin,
}

/// Credential used to seed an admin account when none exists.
///
/// The defaults mirror the system this replaces, so a bare deployment
/// behaves identically; override them in `dashgate.toml` or via
/// `DASHGATE_*` environment variables to close the static-credential
/// gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("users.db"),
            log_level: "info".to_string(),
            bootstrap: BootstrapAdmin::default(),
        }
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, then `dashgate.toml`, then
    /// `DASHGATE_*` environment variables, later sources winning.
    pub fn load() -> Result<Self> {
        Self::load_from("dashgate.toml")
    }

    /// Load settings with an explicit config file path.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DASHGATE_").split("__"))
            .extract()?;
        Ok(settings)
    }
}
