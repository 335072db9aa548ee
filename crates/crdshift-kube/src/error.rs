//! Error types for crdshift-kube

use thiserror::Error;

/// Result type for crdshift-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while inspecting or remapping a captured resource
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// The document could not be interpreted as a CRD-shaped record
    #[error("unable to project item onto a CRD: field '{field}' expected {expected}, found {found}")]
    Projection {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Manifest is missing the fields needed to identify it
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

impl KubeError {
    /// Build a projection error for `field`, describing the value actually found
    pub fn projection(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        KubeError::Projection {
            field: field.into(),
            expected,
            found: value_kind(found),
        }
    }

    /// Check if this is a shape mismatch raised by the CRD projection
    pub fn is_projection(&self) -> bool {
        matches!(self, KubeError::Projection { .. })
    }
}

/// Human-readable name of a JSON value's shape
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
