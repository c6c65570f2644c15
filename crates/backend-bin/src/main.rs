//! Operator CLI for the Dashgate credential store.
//!
//! Runs the same bootstrap the dashboard runs at startup, plus headless
//! provisioning: add users, change roles, list accounts, check a
//! credential pair.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use backend_lib::auth::AuthService;
use backend_lib::store::{CredentialStore, SqliteStore};
use backend_lib::{config::Settings, AppState};
use dashgate_common::Role;

#[derive(Parser)]
#[command(name = "dashgate", about = "Dashgate credential store administration")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "dashgate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and seed the bootstrap admin if none exists
    Init,
    /// Register a new user
    AddUser {
        username: String,
        password: String,
        /// admin, analyst or viewer
        #[arg(long, default_value = "viewer")]
        role: Role,
    },
    /// Change an existing user's role
    SetRole { username: String, role: Role },
    /// List all users and their roles
    ListUsers,
    /// Verify a credential pair without touching any session
    Check { username: String, password: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    let store = Arc::new(
        SqliteStore::open(&settings.db_path)
            .with_context(|| format!("opening credential store at {:?}", settings.db_path))?,
    );
    let state = AppState::new(store, settings).context("initializing credential store")?;

    match cli.command {
        Command::Init => {
            // AppState::new already ran initialize + bootstrap.
            println!("store ready at {:?}", state.settings.db_path);
        },
        Command::AddUser {
            username,
            password,
            role,
        } => {
            state.auth.register(&username, &password, role)?;
            println!("registered '{username}' as {role}");
        },
        Command::SetRole { username, role } => {
            state.store.update_role(&username, role)?;
            println!("role of '{username}' set to {role}");
        },
        Command::ListUsers => {
            for user in state.store.list_all()? {
                println!("{:<24} {}", user.username, user.role);
            }
        },
        Command::Check { username, password } => match state.auth.authenticate(&username, &password)
        {
            Ok(grant) => println!(
                "ok: role {}",
                grant
                    .role
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string())
            ),
            Err(err) => println!("rejected: {}", err.user_message()),
        },
    }

    Ok(())
}
