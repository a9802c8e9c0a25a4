//! SQL text generation per mutation kind.
//!
//! A [`Dialect`] renders statements with positional `?` placeholders. It never
//! sees values: the matching parameter stream comes from [`crate::expand`],
//! driven by the same rows and plans.
//!
//! # Example
//! ```ignore
//! use dbal_bulk::dialect::{Dialect, MySqlDialect};
//! use dbal_bulk::Row;
//!
//! let rows = vec![Row::new().set("name", "Ann"), Row::new().set("name", "Bo")];
//! let sql = MySqlDialect.insert_bulk_sql("users", &rows, false)?;
//! assert_eq!(sql, "INSERT INTO `users` (name) VALUES (?), (?)");
//! ```

mod mysql;


pub use mysql::MySqlDialect;

use crate::error::DbalResult;
use crate::ident::strip_table_name;
use crate::plan::{UpdateBulkPlan, UpdatePlan};
use crate::row::{ReplaceRule, Row};
use std::fmt;

/// Backend family a dialect targets; selects the error classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    MySql,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::MySql => f.write_str("mysql"),
        }
    }
}

/// Statement renderer for one SQL dialect.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Backend this dialect targets.
    fn backend(&self) -> Backend;

    /// Identifier quote character.
    fn quote_char(&self) -> char;

    /// Strip embedded quote characters from a table name, then quote it.
    fn quote_table(&self, table: &str) -> DbalResult<String> {
        let q = self.quote_char();
        let name = strip_table_name(table, q)?;
        Ok(format!("{q}{name}{q}"))
    }

    /// `INSERT [IGNORE] INTO t (f, ...) VALUES (?, ...), ...`
    ///
    /// Columns come from the first row; one tuple is emitted per row.
    fn insert_bulk_sql(&self, table: &str, rows: &[Row], ignore: bool) -> DbalResult<String>;

    /// `UPDATE t SET a = ?, ... WHERE w = ? AND ...`
    fn update_sql(&self, table: &str, plan: &UpdatePlan) -> DbalResult<String>;

    /// `UPDATE t SET f = CASE WHEN (...) THEN ? ... ELSE f END, ... WHERE (...) OR ...`
    fn update_bulk_sql(&self, table: &str, plan: &UpdateBulkPlan<'_>) -> DbalResult<String>;

    /// Insert followed by the dialect's conflict-resolution clause.
    fn upsert_bulk_sql(
        &self,
        table: &str,
        rows: &[Row],
        rules: &[ReplaceRule],
    ) -> DbalResult<String>;

    /// `DELETE FROM t WHERE id = ?`
    fn delete_sql(&self, table: &str, id_field: &str) -> DbalResult<String>;

    /// `DELETE FROM t WHERE id IN (?, ...)`
    fn delete_bulk_sql(&self, table: &str, id_field: &str, count: usize) -> DbalResult<String>;
}

/// `(?, ?, ?)` for `n` placeholders.
pub(crate) fn placeholder_tuple(n: usize) -> String {
    let mut out = String::with_capacity(n * 3 + 1);
    out.push('(');
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out.push(')');
    out
}

/// Count `?` placeholders in generated SQL.
///
/// Generated statements never embed string literals, apart from caller
/// supplied upsert conditions, so a plain scan is exact for them.
pub fn count_placeholders(sql: &str) -> usize {
    sql.bytes().filter(|&b| b == b'?').count()
}
