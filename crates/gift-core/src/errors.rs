//! Cross-cutting error types for GIFT.
//!
//! Every constructor and validating setter in this crate fails fast with a
//! `CoreError`. Schema and configuration errors are defined in their
//! respective crates; `gift-cli` converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised while building or decoding GIFT values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An argument was missing, blank, or outside its allowed range.
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// A name did not match any variant of an enumeration.
    #[error("Enumeration not found: no {enum_type} named '{value}'")]
    EnumerationNotFound { enum_type: String, value: String },

    /// A configuration value is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation is not permitted in the current deployment mode.
    #[error("Deployment mode error ({mode}): {reason}")]
    DeploymentMode { mode: String, reason: String },

    /// Message envelope encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidArgument`].
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`CoreError::EnumerationNotFound`].
    pub fn unknown_variant(enum_type: &str, value: &str) -> Self {
        Self::EnumerationNotFound {
            enum_type: enum_type.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_names_field() {
        let err = CoreError::invalid("confidence", "must be between 0 and 1");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'confidence': must be between 0 and 1"
        );
    }

    #[test]
    fn enumeration_not_found_message() {
        let err = CoreError::unknown_variant("AssessmentLevel", "Great");
        assert_eq!(
            err.to_string(),
            "Enumeration not found: no AssessmentLevel named 'Great'"
        );
    }
}
