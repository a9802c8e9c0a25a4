//! Manager configuration.

/// How insert/upsert rows whose field set differs from the first row's are handled.
///
/// The first row always defines the column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowShapePolicy {
    /// Every row must carry exactly the first row's fields.
    #[default]
    Strict,
    /// Fields absent from the first row are dropped from later rows.
    /// A later row missing one of the first row's fields is still rejected.
    FirstRowWins,
}

/// Configuration for [`DbalManager`](crate::DbalManager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Primary key field, defaulted on insert and used as the implicit update / delete target.
    pub id_field: String,
    /// Creation timestamp field, set on insert when absent or empty.
    pub created_at_field: String,
    /// Modification timestamp field, set on every insert, upsert and update.
    pub updated_at_field: String,
    /// Row shape handling for insert/upsert.
    pub row_shape: RowShapePolicy,
    /// Whether to prefix SQL with the call-context comment.
    pub annotate_sql: bool,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            created_at_field: "createdAt".to_string(),
            updated_at_field: "updatedAt".to_string(),
            row_shape: RowShapePolicy::Strict,
            annotate_sql: true,
            max_sql_log_length: Some(200),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id field name.
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    /// Set the creation timestamp field name.
    pub fn created_at_field(mut self, name: impl Into<String>) -> Self {
        self.created_at_field = name.into();
        self
    }

    /// Set the modification timestamp field name.
    pub fn updated_at_field(mut self, name: impl Into<String>) -> Self {
        self.updated_at_field = name.into();
        self
    }

    /// Set the row shape policy.
    pub fn row_shape(mut self, policy: RowShapePolicy) -> Self {
        self.row_shape = policy;
        self
    }

    /// Disable the call-context SQL comment.
    pub fn no_annotation(mut self) -> Self {
        self.annotate_sql = false;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_log_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ManagerConfig::new()
            .id_field("uuid")
            .updated_at_field("modified")
            .row_shape(RowShapePolicy::FirstRowWins)
            .no_annotation()
            .no_log_truncate();

        assert_eq!(config.id_field, "uuid");
        assert_eq!(config.created_at_field, "createdAt");
        assert_eq!(config.updated_at_field, "modified");
        assert_eq!(config.row_shape, RowShapePolicy::FirstRowWins);
        assert!(!config.annotate_sql);
        assert_eq!(config.max_sql_log_length, None);
    }
}
