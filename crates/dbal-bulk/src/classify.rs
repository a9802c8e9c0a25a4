//! Backend error classification.
//!
//! Backends report constraint violations as message text. A classifier turns
//! that text into a typed [`DbalError`] so callers can branch on the kind of
//! failure instead of parsing messages themselves. An unrecognised message is
//! not a classifier failure: it becomes [`DbalError::Database`].

use crate::dialect::Backend;
use crate::error::{BackendError, DbalError};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Maps a backend failure to a typed error.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, err: BackendError) -> DbalError;
}

/// Classifier used when nothing more specific is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericClassifier;

impl ErrorClassifier for GenericClassifier {
    fn classify(&self, err: BackendError) -> DbalError {
        DbalError::Database(err)
    }
}

static MYSQL_DUPLICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Duplicate entry '(.*?)' for key '(?:[^']*\.)?([^'.]*)'")
        .expect("valid duplicate-entry pattern")
});

static MYSQL_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Check constraint '(.*?)' is violated").expect("valid check-constraint pattern")
});

/// MySQL / MariaDB message formats.
///
/// - `Duplicate entry 'x-y' for key 'db.uniq_name_email'` becomes
///   [`DbalError::UniqueConstraint`] with values `["x", "y"]`
/// - `Check constraint 'chk_qty' is violated.` becomes
///   [`DbalError::CheckConstraint`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlErrorClassifier;

impl ErrorClassifier for MySqlErrorClassifier {
    fn classify(&self, err: BackendError) -> DbalError {
        if let Some(caps) = MYSQL_DUPLICATE.captures(&err.message) {
            let values = caps[1].split('-').map(str::to_string).collect();
            let constraint = caps[2].to_string();
            return DbalError::UniqueConstraint {
                constraint,
                values,
                source: err,
            };
        }

        if let Some(caps) = MYSQL_CHECK.captures(&err.message) {
            let constraint = caps[1].to_string();
            if !constraint.is_empty() {
                return DbalError::CheckConstraint {
                    constraint,
                    source: err,
                };
            }
        }

        DbalError::Database(err)
    }
}

/// The classifier for a backend's message format.
pub fn classifier_for(backend: Backend) -> Arc<dyn ErrorClassifier> {
    match backend {
        Backend::MySql => Arc::new(MySqlErrorClassifier),
    }
}
