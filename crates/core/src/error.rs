//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Reason an entity refused to validate.
///
/// Variants are enumerable on purpose: callers can map each one to a field
/// without parsing messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field has no value.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field has a value that breaks a rule.
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) | Self::InvalidField { field, .. } => field,
        }
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Infrastructure
/// concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An entity failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record could not be resolved.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
