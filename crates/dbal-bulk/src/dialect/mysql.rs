//! MySQL / MariaDB statement rendering.

use super::{Backend, Dialect, placeholder_tuple};
use crate::error::{DbalError, DbalResult};
use crate::plan::{UpdateBulkPlan, UpdatePlan};
use crate::row::{ReplaceRule, Row};

/// MySQL dialect: backtick quoting, `INSERT IGNORE`, `ON DUPLICATE KEY UPDATE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn insert_bulk_sql(&self, table: &str, rows: &[Row], ignore: bool) -> DbalResult<String> {
        let Some(first) = rows.first() else {
            return Err(DbalError::validation("insert requires at least one row"));
        };
        if first.is_empty() {
            return Err(DbalError::validation("insert requires at least one field"));
        }

        let table = self.quote_table(table)?;
        let fields = first.keys().collect::<Vec<_>>().join(", ");
        let tuple = placeholder_tuple(first.len());
        let values = vec![tuple.as_str(); rows.len()].join(", ");
        let verb = if ignore { "INSERT IGNORE" } else { "INSERT" };

        Ok(format!("{verb} INTO {table} ({fields}) VALUES {values}"))
    }

    fn update_sql(&self, table: &str, plan: &UpdatePlan) -> DbalResult<String> {
        let table = self.quote_table(table)?;
        let sets = plan
            .assignments
            .keys()
            .map(|f| format!("{f} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let wheres = plan
            .predicates
            .keys()
            .map(|f| format!("{f} = ?"))
            .collect::<Vec<_>>()
            .join(" AND ");

        Ok(format!("UPDATE {table} SET {sets} WHERE {wheres}"))
    }

    fn update_bulk_sql(&self, table: &str, plan: &UpdateBulkPlan<'_>) -> DbalResult<String> {
        if plan.is_empty() {
            return Err(DbalError::validation(
                "update_bulk requires at least one field to set",
            ));
        }

        let table = self.quote_table(table)?;
        // Every row carries every predicate field, so one guard fits all rows.
        let guard = format!(
            "({})",
            plan.predicate_fields()
                .iter()
                .map(|f| format!("{f}=?"))
                .collect::<Vec<_>>()
                .join(" AND ")
        );

        let mut sets = Vec::with_capacity(plan.columns().len());
        for column in plan.columns() {
            let mut case = format!("{} = CASE", column.field);
            for _ in &column.rows {
                case.push_str(" WHEN ");
                case.push_str(&guard);
                case.push_str(" THEN ?");
            }
            case.push_str(" ELSE ");
            case.push_str(&column.field);
            case.push_str(" END");
            sets.push(case);
        }

        let wheres = vec![guard.as_str(); plan.distinct_rows().len()].join(" OR ");

        Ok(format!("UPDATE {table} SET {} WHERE {wheres}", sets.join(", ")))
    }

    fn upsert_bulk_sql(
        &self,
        table: &str,
        rows: &[Row],
        rules: &[ReplaceRule],
    ) -> DbalResult<String> {
        let insert = self.insert_bulk_sql(table, rows, false)?;
        if rules.is_empty() {
            return Err(DbalError::validation(
                "upsert requires at least one replace rule",
            ));
        }

        let clauses = rules
            .iter()
            .map(|rule| match rule {
                ReplaceRule::Replace(f) => format!("{f} = VALUES({f})"),
                ReplaceRule::Increment(f) => format!("{f} = {f} + VALUES({f})"),
                ReplaceRule::Decrement(f) => format!("{f} = {f} - VALUES({f})"),
                ReplaceRule::Condition { field, expression } => format!("{field} = {expression}"),
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("{insert} ON DUPLICATE KEY UPDATE {clauses}"))
    }

    fn delete_sql(&self, table: &str, id_field: &str) -> DbalResult<String> {
        let table = self.quote_table(table)?;
        Ok(format!("DELETE FROM {table} WHERE {id_field} = ?"))
    }

    fn delete_bulk_sql(&self, table: &str, id_field: &str, count: usize) -> DbalResult<String> {
        if count == 0 {
            return Err(DbalError::validation("delete_bulk requires at least one id"));
        }
        let table = self.quote_table(table)?;
        Ok(format!(
            "DELETE FROM {table} WHERE {id_field} IN {}",
            placeholder_tuple(count)
        ))
    }
}
