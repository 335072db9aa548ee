//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use crdshift_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// A captured CRD could not be projected
    #[error("document #{index}: {message}")]
    #[diagnostic(
        code(crdshift::cli::projection),
        help("the document does not have the shape of a CustomResourceDefinition")
    )]
    Projection { index: usize, message: String },

    /// Input could not be parsed or is not a manifest
    #[error("Invalid input: {message}")]
    #[diagnostic(code(crdshift::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdshift::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(crdshift::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Projection { .. } => exit_codes::PROJECTION_ERROR,
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Wrap a library error raised while handling document `index` (1-based)
    pub fn for_document(index: usize, err: KubeError) -> Self {
        if err.is_projection() {
            Self::Projection {
                index,
                message: err.to_string(),
            }
        } else {
            Self::Input {
                message: format!("document #{}: {}", index, err),
                help: None,
            }
        }
    }

    /// Create an input error (user provided invalid input)
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_maps_to_projection_exit_code() {
        let err = CliError::for_document(
            2,
            KubeError::projection("spec.versions", "a list", &serde_json::json!(1)),
        );
        assert_eq!(err.exit_code(), exit_codes::PROJECTION_ERROR);
        assert!(err.to_string().starts_with("document #2: "));
        assert!(err.to_string().contains("'spec.versions'"));
    }

    #[test]
    fn test_other_library_errors_are_input_errors() {
        let err = CliError::for_document(
            1,
            KubeError::InvalidManifest("missing 'kind' field".into()),
        );
        assert_eq!(err.exit_code(), exit_codes::INPUT_ERROR);
        assert!(err.to_string().contains("missing 'kind' field"));
    }

    #[test]
    fn test_io_error_exit_code() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.exit_code(), exit_codes::IO_ERROR);
    }
}
