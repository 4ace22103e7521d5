//! Schema validation error types.

use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// A message's `type` field is missing or not a string.
    #[error("Message has no '{0}' field")]
    MissingField(&'static str),

    /// Schema compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}
