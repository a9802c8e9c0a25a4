//! Traversal plan for bulk updates.
//!
//! A bulk update renders one `CASE` per assignment field and one `WHEN` per
//! row defining that field, then a `WHERE` listing each distinct predicate
//! tuple once. The SQL text and the parameter stream must walk this structure
//! in exactly the same order, so both are produced from one
//! [`UpdateBulkPlan`] rather than from two independent passes over the rows.

use crate::error::{DbalError, DbalResult};
use crate::row::Row;
use crate::value::{BindValue, FieldValue, normalize};
use std::collections::HashSet;
use std::fmt;

/// The predicate-field values of one row, in predicate-field order.
///
/// Two rows with equal keys target the same database rows. Each value is
/// compared by the exact bytes it binds as (`1` and `"1"` match, as they do in
/// SQL), with `NULL` kept apart from every non-null value. The textual form
/// joins the values with `-` and is for display only, so `("a-b", "c")` and
/// `("a", "b-c")` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredicateKey(Vec<Option<Vec<u8>>>);

impl PredicateKey {
    fn part(value: &BindValue) -> Option<Vec<u8>> {
        match value {
            BindValue::Null => None,
            BindValue::Bytes(b) => Some(b.clone()),
            BindValue::Text(s) => Some(s.as_bytes().to_vec()),
            other => Some(other.to_string().into_bytes()),
        }
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            match part {
                Some(bytes) => f.write_str(&String::from_utf8_lossy(bytes))?,
                None => f.write_str("NULL")?,
            }
        }
        Ok(())
    }
}

/// One `field = CASE ... END` clause: the field and the rows defining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentColumn {
    pub field: String,
    /// Indices into the plan's rows, in row order.
    pub rows: Vec<usize>,
}

/// Shared traversal for bulk-update SQL generation and parameter expansion.
#[derive(Debug, Clone)]
pub struct UpdateBulkPlan<'a> {
    rows: &'a [Row],
    predicate_fields: &'a [String],
    columns: Vec<AssignmentColumn>,
    distinct: Vec<usize>,
}

impl<'a> UpdateBulkPlan<'a> {
    /// Partition `rows` into predicate and assignment fields.
    ///
    /// Assignment fields are ordered by first occurrence across rows. Distinct
    /// predicate keys are ordered by the first row carrying them; rows without
    /// any assignment field take no part in the statement.
    pub fn build(rows: &'a [Row], predicate_fields: &'a [String]) -> DbalResult<Self> {
        if predicate_fields.is_empty() {
            return Err(DbalError::validation(
                "update_bulk requires at least one predicate field",
            ));
        }
        let mut seen_predicates = HashSet::new();
        if let Some(dup) = predicate_fields
            .iter()
            .find(|f| !seen_predicates.insert(f.as_str()))
        {
            return Err(DbalError::validation(format!(
                "Predicate field '{dup}' listed more than once"
            )));
        }

        let mut columns: Vec<AssignmentColumn> = Vec::new();
        let mut distinct = Vec::new();
        let mut seen_keys = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            if let Some(missing) = predicate_fields.iter().find(|f| !row.contains(f)) {
                return Err(DbalError::validation(format!(
                    "update_bulk row {index} is missing predicate field '{missing}'"
                )));
            }

            let mut assigns = false;
            for field in row.keys().filter(|k| !seen_predicates.contains(k)) {
                assigns = true;
                match columns.iter_mut().find(|c| c.field == field) {
                    Some(column) => column.rows.push(index),
                    None => columns.push(AssignmentColumn {
                        field: field.to_string(),
                        rows: vec![index],
                    }),
                }
            }

            if assigns && seen_keys.insert(key_of(row, predicate_fields)) {
                distinct.push(index);
            }
        }

        Ok(Self {
            rows,
            predicate_fields,
            columns,
            distinct,
        })
    }

    pub fn predicate_fields(&self) -> &[String] {
        self.predicate_fields
    }

    /// `CASE` clauses in emission order.
    pub fn columns(&self) -> &[AssignmentColumn] {
        &self.columns
    }

    /// Row indices whose predicate tuple opens a new `WHERE` disjunct.
    pub fn distinct_rows(&self) -> &[usize] {
        &self.distinct
    }

    /// Whether the plan assigns nothing (no `SET` clause can be rendered).
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row(&self, index: usize) -> &'a Row {
        &self.rows[index]
    }

    /// Predicate values of a row, in predicate-field order.
    pub fn predicate_values(&self, index: usize) -> impl Iterator<Item = &'a FieldValue> + '_ {
        let row = self.row(index);
        self.predicate_fields
            .iter()
            .filter_map(move |field| row.get(field))
    }

    pub fn predicate_key(&self, index: usize) -> PredicateKey {
        key_of(self.row(index), self.predicate_fields)
    }
}

/// A single-row update split into its `SET` and `WHERE` parts.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub assignments: Row,
    pub predicates: Row,
}

impl UpdatePlan {
    /// Split `params` against `where_`.
    ///
    /// The id field is never assigned. With an empty `where_` the row is
    /// targeted by its id, which must then be present.
    pub fn resolve(params: &Row, where_: &Row, id_field: &str) -> DbalResult<Self> {
        let mut assignments = params.clone();
        let id = assignments.remove(id_field);

        let predicates = if where_.is_empty() {
            match id {
                Some(id) => Row::new().set(id_field, id),
                None => {
                    return Err(DbalError::validation(format!(
                        "update without a WHERE map requires an '{id_field}' field"
                    )));
                }
            }
        } else {
            where_.clone()
        };

        if assignments.is_empty() {
            return Err(DbalError::validation("update requires at least one field to set"));
        }

        Ok(Self {
            assignments,
            predicates,
        })
    }
}

fn key_of(row: &Row, predicate_fields: &[String]) -> PredicateKey {
    PredicateKey(
        predicate_fields
            .iter()
            .filter_map(|field| row.get(field))
            .map(|value| PredicateKey::part(&normalize(value).0))
            .collect(),
    )
}
