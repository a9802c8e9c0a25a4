//! Error types for dbal-bulk

use std::fmt;
use thiserror::Error;

/// Result type alias for dbal-bulk operations
pub type DbalResult<T> = Result<T, DbalError>;

/// A failure reported by the execution backend, before classification.
///
/// `message` is the backend's own text; classifiers parse it to recover
/// constraint names and conflicting values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// Backend-reported message text.
    pub message: String,
    /// Vendor error code (e.g. MySQL `1062`), when the transport exposes one.
    pub code: Option<u16>,
    /// SQLSTATE, when the transport exposes one.
    pub sql_state: Option<String>,
}

impl BackendError {
    /// Create a backend error from its message text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            sql_state: None,
        }
    }

    /// Attach a vendor error code.
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a SQLSTATE.
    pub fn with_sql_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BackendError {}

/// Error types for mutation and query operations
#[derive(Debug, Error)]
pub enum DbalError {
    /// Unique constraint violation
    #[error("Unique constraint violation on '{constraint}': {values:?}")]
    UniqueConstraint {
        constraint: String,
        values: Vec<String>,
        #[source]
        source: BackendError,
    },

    /// Check constraint violation
    #[error("Check constraint violation: {constraint}")]
    CheckConstraint {
        constraint: String,
        #[source]
        source: BackendError,
    },

    /// Any other backend failure
    #[error("Database error: {0}")]
    Database(#[source] BackendError),

    /// Invalid input (identifiers, row shapes, predicate fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mapping a result row into a value failed
    #[error("Hydrate error: {0}")]
    Hydrate(String),
}

impl DbalError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a hydrate error
    pub fn hydrate(message: impl Into<String>) -> Self {
        Self::Hydrate(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueConstraint { .. })
    }

    /// Check if this is a check constraint violation error
    pub fn is_check_violation(&self) -> bool {
        matches!(self, Self::CheckConstraint { .. })
    }

    /// Name of the violated constraint, if this is a constraint error.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::UniqueConstraint { constraint, .. } | Self::CheckConstraint { constraint, .. } => {
                Some(constraint)
            }
            _ => None,
        }
    }

    /// The underlying backend failure, if any.
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::UniqueConstraint { source, .. } | Self::CheckConstraint { source, .. } => {
                Some(source)
            }
            Self::Database(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display_includes_code() {
        let err = BackendError::new("Duplicate entry 'a' for key 'db.k'").with_code(1062);
        assert_eq!(err.to_string(), "[1062] Duplicate entry 'a' for key 'db.k'");
    }

    #[test]
    fn constraint_accessor() {
        let err = DbalError::CheckConstraint {
            constraint: "chk_price".into(),
            source: BackendError::new("Check constraint 'chk_price' is violated."),
        };
        assert!(err.is_check_violation());
        assert!(!err.is_unique_violation());
        assert_eq!(err.constraint(), Some("chk_price"));
        assert!(err.backend().is_some());

        assert_eq!(DbalError::validation("x").constraint(), None);
    }
}
