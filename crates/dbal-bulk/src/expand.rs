//! Parameter stream expansion.
//!
//! Each function mirrors one [`Dialect`](crate::dialect::Dialect) method and
//! walks its input in the order the placeholders appear in that method's SQL.

use crate::plan::{UpdateBulkPlan, UpdatePlan};
use crate::row::Row;
use crate::value::{FieldValue, Param};

/// Ordered parameters for one statement.
pub type ParamStream = Vec<Param>;

/// Row-major, field-minor: insert, upsert.
pub fn expand_rows(rows: &[Row]) -> ParamStream {
    let width = rows.first().map_or(0, Row::len);
    let mut out = Vec::with_capacity(width * rows.len());
    for row in rows {
        out.extend(row.values().map(Param::flattened));
    }
    out
}

/// Assignments then predicates: single-row update.
pub fn expand_update(plan: &UpdatePlan) -> ParamStream {
    plan.assignments
        .values()
        .chain(plan.predicates.values())
        .map(Param::flattened)
        .collect()
}

/// Bulk update, in two phases.
///
/// 1. For each `CASE` column, for each row defining it: the row's predicate
///    values, then its value for the column.
/// 2. The predicate values once per distinct predicate key, for the `WHERE`.
pub fn expand_update_bulk(plan: &UpdateBulkPlan<'_>) -> ParamStream {
    let width = plan.predicate_fields().len();
    let branches: usize = plan.columns().iter().map(|c| c.rows.len()).sum();
    let mut out = Vec::with_capacity(branches * (width + 1) + plan.distinct_rows().len() * width);

    for column in plan.columns() {
        for &index in &column.rows {
            out.extend(plan.predicate_values(index).map(Param::hinted));
            if let Some(value) = plan.row(index).get(&column.field) {
                out.push(Param::hinted(value));
            }
        }
    }

    for &index in plan.distinct_rows() {
        out.extend(plan.predicate_values(index).map(Param::hinted));
    }

    out
}

/// One parameter per id: bulk delete.
pub fn expand_ids(ids: &[FieldValue]) -> ParamStream {
    ids.iter().map(Param::flattened).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BindType, BindValue};

    fn text(s: &str) -> BindValue {
        BindValue::Text(s.to_string())
    }

    fn values(stream: &ParamStream) -> Vec<BindValue> {
        stream.iter().map(|p| p.value.clone()).collect()
    }

    #[test]
    fn rows_are_row_major() {
        let rows = vec![
            Row::new().set("a", "1").set("b", true),
            Row::new().set("a", "2").set("b", false),
        ];
        let stream = expand_rows(&rows);
        assert_eq!(
            values(&stream),
            [text("1"), BindValue::Int(1), text("2"), BindValue::Int(0)]
        );
        assert!(stream.iter().all(|p| p.ty == Some(BindType::String)));
    }

    #[test]
    fn update_is_assignments_then_predicates() {
        let plan = UpdatePlan::resolve(
            &Row::new().set("id", "5").set("name", "Ann").set("age", 30),
            &Row::new(),
            "id",
        )
        .unwrap();
        assert_eq!(
            values(&expand_update(&plan)),
            [text("Ann"), BindValue::Int(30), text("5")]
        );
    }

    #[test]
    fn bulk_update_two_phase() {
        let rows = vec![
            Row::new().set("id", 1).set("a", "x"),
            Row::new().set("id", 2).set("a", "y").set("b", "z"),
        ];
        let fields = vec!["id".to_string()];
        let plan = UpdateBulkPlan::build(&rows, &fields).unwrap();
        assert_eq!(
            values(&expand_update_bulk(&plan)),
            [
                // a: row 0, row 1
                BindValue::Int(1),
                text("x"),
                BindValue::Int(2),
                text("y"),
                // b: row 1
                BindValue::Int(2),
                text("z"),
                // WHERE
                BindValue::Int(1),
                BindValue::Int(2),
            ]
        );
    }

    #[test]
    fn bulk_update_keeps_hints() {
        let rows = vec![
            Row::new()
                .set("id", FieldValue::typed(1, BindType::Integer))
                .set("a", "x"),
        ];
        let fields = vec!["id".to_string()];
        let plan = UpdateBulkPlan::build(&rows, &fields).unwrap();
        let stream = expand_update_bulk(&plan);
        assert_eq!(stream[0].ty, Some(BindType::Integer));
        assert_eq!(stream[1].ty, None);
    }

    #[test]
    fn ids() {
        let stream = expand_ids(&["a".into(), "b".into()]);
        assert_eq!(values(&stream), [text("a"), text("b")]);
    }
}
