//! Adapter for rendering [`CliError`] values with miette.
//!
//! The library errors carry no diagnostic metadata of their own. This module
//! wraps them and supplies a stable code and, where one exists, a hint for
//! the user.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use archmodel::ModelError;

use crate::{config::ConfigError, error::CliError};

/// Wraps a [`CliError`] to implement [`miette::Diagnostic`].
pub struct ErrorAdapter<'a>(&'a CliError);

impl<'a> ErrorAdapter<'a> {
    pub fn new(err: &'a CliError) -> Self {
        Self(err)
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let code = match self.0 {
            CliError::Io { .. } => "archmodel::io",
            CliError::Json { .. } => "archmodel::json",
            CliError::Config(_) => "archmodel::config",
            CliError::Model(ModelError::NotFound(_)) => "archmodel::model::not_found",
            CliError::Model(ModelError::InvalidArgument(_)) => "archmodel::model::invalid_argument",
            CliError::Model(ModelError::InvariantViolation(_)) => "archmodel::model::invariant",
            CliError::Model(ModelError::EmptySelection(_)) => "archmodel::model::empty_selection",
        };
        Some(Box::new(code))
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let help = match self.0 {
            CliError::Json { .. } => "the file must contain a workspace serialized as JSON",
            CliError::Config(ConfigError::MissingFile(_)) => {
                "pass an existing file to --config, or omit it to use the defaults"
            }
            CliError::Model(ModelError::NotFound(_)) => {
                "every element and relationship referenced by a view must exist in the model"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}
