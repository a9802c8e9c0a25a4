//! Row maps and upsert replace rules.

use crate::value::FieldValue;

/// An ordered mapping from field name to [`FieldValue`].
///
/// Field order is insertion order and drives placeholder order in the
/// generated SQL. Setting an existing field replaces its value in place.
///
/// # Example
/// ```ignore
/// let row = Row::new().set("name", "Ann").set("active", true);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field, consuming and returning the row.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(name, _)| name == field)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Field values in order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether both rows carry the same field names, ignoring order.
    pub fn same_fields(&self, other: &Row) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains(k))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Conflict-resolution instruction for one field of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceRule {
    /// `f = VALUES(f)`
    Replace(String),
    /// `f = f + VALUES(f)`
    Increment(String),
    /// `f = f - VALUES(f)`
    Decrement(String),
    /// `f = <expression>`
    ///
    /// **Warning**: the expression is emitted verbatim. Only use with trusted SQL.
    Condition { field: String, expression: String },
}

impl ReplaceRule {
    pub fn replace(field: impl Into<String>) -> Self {
        ReplaceRule::Replace(field.into())
    }

    pub fn increment(field: impl Into<String>) -> Self {
        ReplaceRule::Increment(field.into())
    }

    pub fn decrement(field: impl Into<String>) -> Self {
        ReplaceRule::Decrement(field.into())
    }

    pub fn condition(field: impl Into<String>, expression: impl Into<String>) -> Self {
        ReplaceRule::Condition {
            field: field.into(),
            expression: expression.into(),
        }
    }

    /// The field this rule writes.
    pub fn field(&self) -> &str {
        match self {
            ReplaceRule::Replace(f) | ReplaceRule::Increment(f) | ReplaceRule::Decrement(f) => f,
            ReplaceRule::Condition { field, .. } => field,
        }
    }
}

impl From<&str> for ReplaceRule {
    fn from(field: &str) -> Self {
        ReplaceRule::replace(field)
    }
}

impl From<String> for ReplaceRule {
    fn from(field: String) -> Self {
        ReplaceRule::Replace(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_first_position() {
        let row = Row::new().set("a", 1).set("b", 2).set("a", 3);
        assert_eq!(row.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(row.get("a"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn remove_field() {
        let mut row = Row::new().set("id", "5").set("name", "Ann");
        assert_eq!(row.remove("id"), Some(FieldValue::Text("5".into())));
        assert_eq!(row.remove("id"), None);
        assert_eq!(row.keys().collect::<Vec<_>>(), ["name"]);
    }

    #[test]
    fn same_fields_ignores_order() {
        let a = Row::new().set("x", 1).set("y", 2);
        let b = Row::new().set("y", 2).set("x", 1);
        let c = Row::new().set("x", 1);
        assert!(a.same_fields(&b));
        assert!(!a.same_fields(&c));
    }

    #[test]
    fn collect_from_pairs() {
        let row: Row = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn rule_field() {
        assert_eq!(ReplaceRule::from("count").field(), "count");
        assert_eq!(ReplaceRule::condition("n", "GREATEST(n, VALUES(n))").field(), "n");
    }
}
