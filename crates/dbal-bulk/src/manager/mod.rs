//! Mutation entry points.
//!
//! [`DbalManager`] drives every mutation through the same stages:
//!
//! 1. **Preparing**: validate field names, apply id / createdAt / updatedAt defaults
//! 2. **Generating**: render SQL through the configured [`Dialect`]
//! 3. **Expanding**: build the parameter stream from the same input
//! 4. **Executing**: one call on the [`Executor`]; failures go through the
//!    [`ErrorClassifier`]
//!
//! Bulk calls with no rows (or ids) return `Ok(0)` without touching the executor.
//!
//! # Example
//! ```ignore
//! use dbal_bulk::{CallContext, DbalManager, ReplaceRule, Row};
//!
//! let db = DbalManager::new(executor);
//!
//! db.insert_bulk(
//!     "users",
//!     vec![Row::new().set("name", "Ann"), Row::new().set("name", "Bo")],
//!     false,
//! )
//! .await?;
//!
//! db.in_context(CallContext::new("ImportCommand", "Importer::run"))
//!     .upsert(
//!         "counters",
//!         Row::new().set("name", "visits").set("count", 1),
//!         vec![ReplaceRule::increment("count")],
//!     )
//!     .await?;
//! ```


use crate::classify::{ErrorClassifier, classifier_for};
use crate::config::{ManagerConfig, RowShapePolicy};
use crate::context::CallContext;
use crate::defaults::{Clock, IdGenerator, SystemClock};
use crate::dialect::{Dialect, MySqlDialect, count_placeholders};
use crate::error::{DbalError, DbalResult};
use crate::executor::Executor;
use crate::expand::{ParamStream, expand_ids, expand_rows, expand_update, expand_update_bulk};
use crate::hydrate::{FromResultRow, ResultRow};
use crate::ident::{validate_field, validate_fields};
use crate::plan::{UpdateBulkPlan, UpdatePlan};
use crate::row::{ReplaceRule, Row};
use crate::value::{FieldValue, Param};
use std::fmt;
use std::sync::Arc;

/// The kind of mutation being performed, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    UpdateBulk,
    Upsert,
    Delete,
    DeleteBulk,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Insert => "insert",
            MutationKind::Update => "update",
            MutationKind::UpdateBulk => "update_bulk",
            MutationKind::Upsert => "upsert",
            MutationKind::Delete => "delete",
            MutationKind::DeleteBulk => "delete_bulk",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a mutation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Preparing,
    Generating,
    Expanding,
    Executing,
    Succeeded,
    Failed,
}

fn enter(kind: MutationKind, table: &str, stage: MutationStage) {
    tracing::trace!(target: "dbal.mutation", op = kind.as_str(), table, ?stage);
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Bulk mutation manager over an [`Executor`].
///
/// Cloning is cheap; clones share the executor and providers.
pub struct DbalManager<E> {
    executor: Arc<E>,
    dialect: Arc<dyn Dialect>,
    classifier: Arc<dyn ErrorClassifier>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    clock: Arc<dyn Clock>,
    config: Arc<ManagerConfig>,
    context: CallContext,
}

impl<E> Clone for DbalManager<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            dialect: Arc::clone(&self.dialect),
            classifier: Arc::clone(&self.classifier),
            id_generator: self.id_generator.clone(),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
            context: self.context.clone(),
        }
    }
}

impl<E> fmt::Debug for DbalManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbalManager")
            .field("dialect", &self.dialect)
            .field("config", &self.config)
            .field("context", &self.context)
            .field("id_generator", &self.id_generator.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: Executor> DbalManager<E> {
    /// Create a manager using the MySQL dialect, the system clock, and no id generator.
    pub fn new(executor: E) -> Self {
        let dialect = MySqlDialect;
        Self {
            executor: Arc::new(executor),
            classifier: classifier_for(dialect.backend()),
            dialect: Arc::new(dialect),
            id_generator: None,
            clock: Arc::new(SystemClock),
            config: Arc::new(ManagerConfig::default()),
            context: CallContext::default(),
        }
    }

    /// Use another dialect. Also selects that backend's error classifier;
    /// call [`DbalManager::with_classifier`] afterwards to override it.
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.classifier = classifier_for(dialect.backend());
        self.dialect = Arc::new(dialect);
        self
    }

    /// Override the error classifier.
    pub fn with_classifier(mut self, classifier: impl ErrorClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Generate ids for inserted rows that have none.
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Some(Arc::new(generator));
        self
    }

    /// Override the clock used for createdAt / updatedAt.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// A manager sharing this one's executor, annotating SQL with `context`.
    pub fn in_context(&self, context: CallContext) -> Self {
        let mut scoped = self.clone();
        scoped.context = context;
        scoped
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    // ==================== insert ====================

    /// Insert one row.
    pub async fn insert(&self, table: &str, row: Row, ignore: bool) -> DbalResult<u64> {
        self.insert_bulk(table, vec![row], ignore).await
    }

    /// Insert rows in one statement, applying id / createdAt / updatedAt defaults.
    ///
    /// With `ignore`, the statement is `INSERT IGNORE`.
    pub async fn insert_bulk(&self, table: &str, rows: Vec<Row>, ignore: bool) -> DbalResult<u64> {
        self.insert_rows(table, rows, ignore, true).await
    }

    /// Insert rows exactly as given, without applying field defaults.
    pub async fn insert_bulk_raw(
        &self,
        table: &str,
        rows: Vec<Row>,
        ignore: bool,
    ) -> DbalResult<u64> {
        self.insert_rows(table, rows, ignore, false).await
    }

    async fn insert_rows(
        &self,
        table: &str,
        rows: Vec<Row>,
        ignore: bool,
        apply_defaults: bool,
    ) -> DbalResult<u64> {
        let kind = MutationKind::Insert;
        if rows.is_empty() {
            tracing::trace!(target: "dbal.mutation", op = kind.as_str(), table, "no rows, skipping");
            return Ok(0);
        }

        enter(kind, table, MutationStage::Preparing);
        let rows = if apply_defaults {
            self.prepare_insert_rows(rows)
        } else {
            rows
        };
        let rows = self.align_rows(rows)?;
        self.validate_row_fields(&rows)?;

        enter(kind, table, MutationStage::Generating);
        let sql = self.dialect.insert_bulk_sql(table, &rows, ignore)?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_rows(&rows);

        self.execute(kind, table, sql, params).await
    }

    // ==================== update ====================

    /// Update the row identified by `params`' id field.
    ///
    /// The id is never assigned; updatedAt is set to now.
    pub async fn update(&self, table: &str, params: Row) -> DbalResult<u64> {
        self.update_where(table, params, Row::new()).await
    }

    /// Update rows matching every field of `where_` (AND-combined).
    ///
    /// An empty `where_` targets `params`' id field.
    pub async fn update_where(&self, table: &str, params: Row, where_: Row) -> DbalResult<u64> {
        let kind = MutationKind::Update;

        enter(kind, table, MutationStage::Preparing);
        let params = self.prepare_update_row(params);
        let plan = UpdatePlan::resolve(&params, &where_, &self.config.id_field)?;
        validate_fields(plan.assignments.keys().chain(plan.predicates.keys()))?;

        enter(kind, table, MutationStage::Generating);
        let sql = self.dialect.update_sql(table, &plan)?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_update(&plan);

        self.execute(kind, table, sql, params).await
    }

    /// Update many rows in one statement, each identified by its id field.
    pub async fn update_bulk(&self, table: &str, rows: Vec<Row>) -> DbalResult<u64> {
        let id_field = self.config.id_field.clone();
        self.update_bulk_by(table, rows, &[id_field.as_str()]).await
    }

    /// Update many rows in one statement, each identified by `predicate_fields`.
    ///
    /// Every other field of a row is assigned through a `CASE` on that row's
    /// predicate tuple; fields a row does not carry are left unchanged for it.
    /// Rows repeating a predicate tuple share one `WHERE` disjunct.
    pub async fn update_bulk_by(
        &self,
        table: &str,
        rows: Vec<Row>,
        predicate_fields: &[&str],
    ) -> DbalResult<u64> {
        let kind = MutationKind::UpdateBulk;
        if rows.is_empty() {
            tracing::trace!(target: "dbal.mutation", op = kind.as_str(), table, "no rows, skipping");
            return Ok(0);
        }

        enter(kind, table, MutationStage::Preparing);
        validate_fields(predicate_fields.iter().copied())?;
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| self.prepare_update_row(row))
            .collect();
        self.validate_row_fields(&rows)?;
        let predicate_fields: Vec<String> =
            predicate_fields.iter().map(|f| f.to_string()).collect();
        let plan = UpdateBulkPlan::build(&rows, &predicate_fields)?;

        enter(kind, table, MutationStage::Generating);
        let sql = self.dialect.update_bulk_sql(table, &plan)?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_update_bulk(&plan);

        self.execute(kind, table, sql, params).await
    }

    // ==================== upsert ====================

    /// Insert one row, resolving key conflicts with `rules`.
    pub async fn upsert(&self, table: &str, row: Row, rules: Vec<ReplaceRule>) -> DbalResult<u64> {
        self.upsert_bulk(table, vec![row], rules).await
    }

    /// Insert rows, resolving key conflicts with `rules`.
    ///
    /// A plain replace of updatedAt is appended unless a rule already covers it.
    pub async fn upsert_bulk(
        &self,
        table: &str,
        rows: Vec<Row>,
        mut rules: Vec<ReplaceRule>,
    ) -> DbalResult<u64> {
        let kind = MutationKind::Upsert;
        if rows.is_empty() {
            tracing::trace!(target: "dbal.mutation", op = kind.as_str(), table, "no rows, skipping");
            return Ok(0);
        }

        enter(kind, table, MutationStage::Preparing);
        let rows = self.align_rows(self.prepare_insert_rows(rows))?;
        self.validate_row_fields(&rows)?;
        let updated_at = &self.config.updated_at_field;
        if !rules.iter().any(|rule| rule.field() == updated_at.as_str()) {
            rules.push(ReplaceRule::replace(updated_at.as_str()));
        }
        validate_fields(rules.iter().map(ReplaceRule::field))?;

        enter(kind, table, MutationStage::Generating);
        let sql = self.dialect.upsert_bulk_sql(table, &rows, &rules)?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_rows(&rows);

        self.execute(kind, table, sql, params).await
    }

    // ==================== delete ====================

    /// Delete the row with the given id. The id is bound, never embedded.
    pub async fn delete(&self, table: &str, id: impl Into<FieldValue>) -> DbalResult<u64> {
        let kind = MutationKind::Delete;

        enter(kind, table, MutationStage::Preparing);
        validate_field(&self.config.id_field)?;

        enter(kind, table, MutationStage::Generating);
        let sql = self.dialect.delete_sql(table, &self.config.id_field)?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_ids(&[id.into()]);

        self.execute(kind, table, sql, params).await
    }

    /// Delete all rows whose id is in `ids`.
    pub async fn delete_bulk<I, V>(&self, table: &str, ids: I) -> DbalResult<u64>
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let kind = MutationKind::DeleteBulk;
        let ids: Vec<FieldValue> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            tracing::trace!(target: "dbal.mutation", op = kind.as_str(), table, "no ids, skipping");
            return Ok(0);
        }

        enter(kind, table, MutationStage::Preparing);
        validate_field(&self.config.id_field)?;

        enter(kind, table, MutationStage::Generating);
        let sql = self
            .dialect
            .delete_bulk_sql(table, &self.config.id_field, ids.len())?;

        enter(kind, table, MutationStage::Expanding);
        let params = expand_ids(&ids);

        self.execute(kind, table, sql, params).await
    }

    // ==================== read ====================

    /// Run a query and return all rows.
    ///
    /// Values bind with their explicit type hint, if any; otherwise the
    /// transport infers the type.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: &[FieldValue],
    ) -> DbalResult<Vec<ResultRow>> {
        let params: Vec<Param> = params.iter().map(Param::hinted).collect();
        let exec_sql = self.annotate(sql);
        self.log_sql("query", "-", &exec_sql, params.len());

        self.executor
            .execute_query(&exec_sql, &params)
            .await
            .map_err(|err| {
                tracing::warn!(target: "dbal.sql", error = %err, "query failed");
                DbalError::Database(err)
            })
    }

    /// Run a query and map the first row, if any.
    pub async fn fetch_one<T, F>(&self, sql: &str, params: &[FieldValue], map: F) -> DbalResult<Option<T>>
    where
        F: FnOnce(&ResultRow) -> DbalResult<T>,
    {
        let rows = self.execute_query(sql, params).await?;
        rows.first().map(map).transpose()
    }

    /// Run a query and map every row.
    pub async fn fetch_all<T, F>(&self, sql: &str, params: &[FieldValue], map: F) -> DbalResult<Vec<T>>
    where
        F: FnMut(&ResultRow) -> DbalResult<T>,
    {
        let rows = self.execute_query(sql, params).await?;
        rows.iter().map(map).collect()
    }

    /// [`DbalManager::fetch_one`] through [`FromResultRow`].
    pub async fn fetch_one_as<T: FromResultRow>(
        &self,
        sql: &str,
        params: &[FieldValue],
    ) -> DbalResult<Option<T>> {
        self.fetch_one(sql, params, T::from_result_row).await
    }

    /// [`DbalManager::fetch_all`] through [`FromResultRow`].
    pub async fn fetch_all_as<T: FromResultRow>(
        &self,
        sql: &str,
        params: &[FieldValue],
    ) -> DbalResult<Vec<T>> {
        self.fetch_all(sql, params, T::from_result_row).await
    }

    // ==================== internals ====================

    fn prepare_insert_rows(&self, rows: Vec<Row>) -> Vec<Row> {
        let now = FieldValue::Timestamp(self.clock.now());
        let config = &self.config;

        rows.into_iter()
            .map(|mut row| {
                if let Some(generator) = &self.id_generator
                    && row.get(&config.id_field).is_none_or(FieldValue::is_empty)
                {
                    row.insert(config.id_field.as_str(), generator.generate_id());
                }
                if row
                    .get(&config.created_at_field)
                    .is_none_or(FieldValue::is_empty)
                {
                    row.insert(config.created_at_field.as_str(), now.clone());
                }
                row.insert(config.updated_at_field.as_str(), now.clone());
                row
            })
            .collect()
    }

    fn prepare_update_row(&self, mut row: Row) -> Row {
        row.insert(
            self.config.updated_at_field.as_str(),
            FieldValue::Timestamp(self.clock.now()),
        );
        row
    }

    /// Put every row in the first row's field order, enforcing the row shape policy.
    fn align_rows(&self, rows: Vec<Row>) -> DbalResult<Vec<Row>> {
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else {
            return Ok(Vec::new());
        };
        let policy = self.config.row_shape;

        let rest = rows
            .enumerate()
            .map(|(offset, mut row)| {
                let index = offset + 1;
                if !row.same_fields(&first) {
                    if let Some(extra) = row.keys().find(|k| !first.contains(k)) {
                        if policy == RowShapePolicy::Strict {
                            return Err(DbalError::validation(format!(
                                "row {index} has field '{extra}' not present in the first row"
                            )));
                        }
                        tracing::debug!(
                            target: "dbal.mutation",
                            row = index,
                            field = extra,
                            "dropping field not present in the first row"
                        );
                    }
                }
                let mut aligned = Row::new();
                for column in first.keys() {
                    let Some(value) = row.remove(column) else {
                        return Err(DbalError::validation(format!(
                            "row {index} is missing field '{column}' present in the first row"
                        )));
                    };
                    aligned.insert(column, value);
                }
                Ok(aligned)
            })
            .collect::<DbalResult<Vec<Row>>>()?;

        Ok(std::iter::once(first).chain(rest).collect())
    }

    fn validate_row_fields(&self, rows: &[Row]) -> DbalResult<()> {
        // Aligned rows share the first row's fields; update rows may vary.
        rows.iter().try_for_each(|row| validate_fields(row.keys()))
    }

    fn annotate(&self, sql: &str) -> String {
        if self.config.annotate_sql {
            self.context.annotate(sql)
        } else {
            sql.to_string()
        }
    }

    fn log_sql(&self, op: &str, table: &str, exec_sql: &str, param_count: usize) {
        let sql = match self.config.max_sql_log_length {
            Some(max) if exec_sql.len() > max => {
                format!("{}...", truncate_sql_bytes(exec_sql, max))
            }
            _ => exec_sql.to_string(),
        };
        tracing::debug!(target: "dbal.sql", op, table, param_count, sql = %sql);
    }

    async fn execute(
        &self,
        kind: MutationKind,
        table: &str,
        sql: String,
        params: ParamStream,
    ) -> DbalResult<u64> {
        let placeholders = count_placeholders(&sql);
        if placeholders != params.len() {
            tracing::warn!(
                target: "dbal.sql",
                op = kind.as_str(),
                table,
                placeholders,
                param_count = params.len(),
                "placeholder count differs from parameter count"
            );
        }

        enter(kind, table, MutationStage::Executing);
        let exec_sql = self.annotate(&sql);
        self.log_sql(kind.as_str(), table, &exec_sql, params.len());

        match self.executor.execute_statement(&exec_sql, &params).await {
            Ok(affected) => {
                enter(kind, table, MutationStage::Succeeded);
                Ok(affected)
            }
            Err(err) => {
                enter(kind, table, MutationStage::Failed);
                let err = self.classifier.classify(err);
                tracing::warn!(target: "dbal.sql", op = kind.as_str(), table, error = %err, "statement failed");
                Err(err)
            }
        }
    }
}
