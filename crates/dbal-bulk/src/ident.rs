//! Identifier handling for table and field names.
//!
//! Identifiers cannot be bound as parameters, so they reach the SQL text
//! directly:
//!
//! - Table names have every quote character stripped before the dialect wraps
//!   them in its own quotes, so a crafted name cannot close the quoting early.
//! - Field names are emitted unquoted and must match `[A-Za-z_][A-Za-z0-9_$]*`.

use crate::error::{DbalError, DbalResult};

/// Strip `quote` from a table name and reject names that end up unusable.
pub fn strip_table_name(raw: &str, quote: char) -> DbalResult<String> {
    if raw.contains('\0') {
        return Err(DbalError::validation(
            "Table name cannot contain NUL character",
        ));
    }
    let stripped: String = raw.chars().filter(|&c| c != quote).collect();
    if stripped.trim().is_empty() {
        return Err(DbalError::validation(format!(
            "Table name '{raw}' is empty after stripping quotes"
        )));
    }
    Ok(stripped)
}

/// Validate a field name used as a column or predicate.
pub fn validate_field(name: &str) -> DbalResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(DbalError::validation("Field name cannot be empty"));
    };
    if first != '_' && !first.is_ascii_alphabetic() {
        return Err(DbalError::validation(format!(
            "Invalid field name start character in '{name}': '{first}'"
        )));
    }
    if let Some(c) = chars.find(|&c| c != '_' && c != '$' && !c.is_ascii_alphanumeric()) {
        return Err(DbalError::validation(format!(
            "Invalid character in field name '{name}': '{c}'"
        )));
    }
    Ok(())
}

/// Validate every field name in `names`.
pub fn validate_fields<'a>(names: impl IntoIterator<Item = &'a str>) -> DbalResult<()> {
    names.into_iter().try_for_each(validate_field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_embedded_quotes() {
        assert_eq!(strip_table_name("users", '`').unwrap(), "users");
        assert_eq!(strip_table_name("`users`", '`').unwrap(), "users");
        assert_eq!(
            strip_table_name("users` ; DROP TABLE x; `", '`').unwrap(),
            "users ; DROP TABLE x; "
        );
    }

    #[test]
    fn rejects_empty_table() {
        assert!(strip_table_name("", '`').is_err());
        assert!(strip_table_name("``", '`').is_err());
        assert!(strip_table_name("a\0b", '`').is_err());
    }

    #[test]
    fn field_names() {
        assert!(validate_field("createdAt").is_ok());
        assert!(validate_field("_tmp$1").is_ok());
        assert!(validate_field("").is_err());
        assert!(validate_field("1col").is_err());
        assert!(validate_field("bad col").is_err());
        assert!(validate_field("x = 1 --").is_err());
    }

    #[test]
    fn validate_many_reports_first_bad() {
        let err = validate_fields(["ok", "also_ok", "no;pe"]).unwrap_err();
        assert!(err.to_string().contains("no;pe"));
    }
}
