//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The pricing library rejected the request.
    #[error(transparent)]
    Pricing(#[from] qq_core::Error),

    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`EngineSettings`](crate::config::EngineSettings).
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON rendering failed.
    #[error("cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Command-line arguments are inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
