//! CLI subcommands.

pub mod access;
pub mod roles;

use std::path::PathBuf;

use marketplace_admin::DirectoryError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The fixture file could not be read.
    #[error("Failed to read fixture {path}: {source}")]
    ReadFixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture file is not a valid assignment list.
    #[error("Invalid fixture: {0}")]
    Directory(#[from] DirectoryError),

    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
