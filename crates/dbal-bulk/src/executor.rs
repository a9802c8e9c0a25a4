//! Execution capability consumed by the manager.

use crate::error::BackendError;
use crate::hydrate::ResultRow;
use crate::value::Param;
use std::future::Future;
use std::sync::Arc;

/// A connection, pool, or transaction able to run SQL with positional params.
///
/// Implementations report failures as [`BackendError`] with the backend's own
/// message text; classification into typed errors happens in the manager.
/// Passing a transaction handle here is how callers group several mutations
/// atomically.
pub trait Executor: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute_statement(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send;

    /// Execute a query and return all rows.
    fn execute_query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<Vec<ResultRow>, BackendError>> + Send;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute_statement(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send {
        (**self).execute_statement(sql, params)
    }

    fn execute_query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<Vec<ResultRow>, BackendError>> + Send {
        (**self).execute_query(sql, params)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute_statement(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send {
        (**self).execute_statement(sql, params)
    }

    fn execute_query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl Future<Output = Result<Vec<ResultRow>, BackendError>> + Send {
        (**self).execute_query(sql, params)
    }
}
