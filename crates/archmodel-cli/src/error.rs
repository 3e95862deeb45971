use std::{io, path::PathBuf};

use thiserror::Error;

use archmodel::ModelError;

use crate::config::ConfigError;

/// Errors produced while running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid workspace JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
