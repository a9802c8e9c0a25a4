//! Result rows and their mapping into caller types.
//!
//! Mapping is supplied per call site, either as a closure or through
//! [`FromResultRow`]; nothing is instantiated by name.

use crate::error::{DbalError, DbalResult};
use crate::value::BindValue;

/// One row returned by [`Executor::execute_query`](crate::Executor::execute_query).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, BindValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with(mut self, column: impl Into<String>, value: BindValue) -> Self {
        self.columns.push((column.into(), value));
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: BindValue) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&BindValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column, returning [`DbalError::Hydrate`] if it is absent.
    pub fn try_get(&self, column: &str) -> DbalResult<&BindValue> {
        self.get(column)
            .ok_or_else(|| DbalError::hydrate(format!("missing column '{column}'")))
    }

    /// Get a text column. Byte columns are accepted when they hold UTF-8.
    pub fn try_get_str(&self, column: &str) -> DbalResult<String> {
        match self.try_get(column)? {
            BindValue::Text(s) => Ok(s.clone()),
            BindValue::Bytes(b) => String::from_utf8(b.clone()).map_err(|e| {
                DbalError::hydrate(format!("column '{column}' is not UTF-8: {e}"))
            }),
            other => Err(DbalError::hydrate(format!(
                "column '{column}' is not text: {other:?}"
            ))),
        }
    }

    /// Get an integer column. Numeric text (as MySQL's text protocol returns) is parsed.
    pub fn try_get_i64(&self, column: &str) -> DbalResult<i64> {
        let value = self.try_get(column)?;
        if let Some(v) = value.as_i64() {
            return Ok(v);
        }
        let text = match value {
            BindValue::Text(s) => Some(s.as_str()),
            BindValue::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        };
        text.and_then(|s| s.parse().ok()).ok_or_else(|| {
            DbalError::hydrate(format!("column '{column}' is not an integer: {value:?}"))
        })
    }

    /// Get a nullable text column.
    pub fn try_get_opt_str(&self, column: &str) -> DbalResult<Option<String>> {
        if self.try_get(column)?.is_null() {
            return Ok(None);
        }
        self.try_get_str(column).map(Some)
    }
}

/// Map a [`ResultRow`] into a value.
pub trait FromResultRow: Sized {
    fn from_result_row(row: &ResultRow) -> DbalResult<Self>;
}

impl FromResultRow for ResultRow {
    fn from_result_row(row: &ResultRow) -> DbalResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let row = ResultRow::new()
            .with("id", BindValue::Bytes(b"42".to_vec()))
            .with("name", BindValue::Text("Ann".into()))
            .with("nick", BindValue::Null);

        assert_eq!(row.try_get_i64("id").unwrap(), 42);
        assert_eq!(row.try_get_str("name").unwrap(), "Ann");
        assert_eq!(row.try_get_opt_str("nick").unwrap(), None);
        assert!(row.try_get("missing").is_err());
        assert!(row.try_get_i64("name").is_err());
    }
}
