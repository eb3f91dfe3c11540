//! Marketplace CLI - role catalog and access inspection.
//!
//! # Usage
//!
//! ```bash
//! # List roles and permissions
//! marketplace-cli roles
//!
//! # Resolve a user's access from a directory fixture
//! marketplace-cli access --fixture assignments.json --user 0b8e4f7a-3c2d-4e1f-9a6b-5c4d3e2f1a0b
//!
//! # Same, as JSON
//! marketplace-cli access --fixture assignments.json --user 0b8e4f7a-... --json
//! ```
//!
//! # Commands
//!
//! - `roles` - Print the role and permission catalog
//! - `access` - Resolve roles, permissions and admin navigation for a user

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marketplace_admin::AdminConfig;
use marketplace_admin::telemetry::{init_sentry, init_tracing};
use marketplace_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "marketplace-cli")]
#[command(author, version, about = "Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the role and permission catalog
    Roles,
    /// Resolve a user's access from a directory fixture
    Access {
        /// JSON file with an array of `{ user_id, roles, permissions }` rows
        #[arg(short, long)]
        fixture: PathBuf,

        /// User to resolve
        #[arg(short, long)]
        user: UserId,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; fall back to defaults so the error is visible.
            init_tracing(&AdminConfig::default(), "marketplace_cli=info");
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry before tracing so the sentry layer has a client
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config, "marketplace_cli=info,marketplace_admin=info");

    let result: Result<(), commands::CliError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Roles => commands::roles::print_catalog(),
        Commands::Access {
            fixture,
            user,
            json,
        } => commands::access::inspect(&fixture, user, json).await?,
    }
    Ok(())
}
