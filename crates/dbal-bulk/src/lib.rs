//! # dbal-bulk
//!
//! Bulk mutation statements with positional parameter binding.
//!
//! ## Features
//!
//! - **One round-trip per bulk call**: multi-row `INSERT`, `CASE`-based bulk `UPDATE`,
//!   `ON DUPLICATE KEY UPDATE` upserts, `IN (...)` deletes
//! - **Ordered binding**: SQL and parameter stream are derived from the same plan,
//!   so placeholders and values never drift apart
//! - **Field defaults**: id (via an [`IdGenerator`]), `createdAt` and `updatedAt`
//! - **Typed errors**: backend constraint messages become [`DbalError`] variants
//! - **Call context**: statements can carry a JSON comment naming their caller
//! - **Transaction-friendly**: anything implementing [`Executor`] can run statements
//!
//! ## Example
//!
//! ```ignore
//! use dbal_bulk::prelude::*;
//!
//! let db = DbalManager::new(executor).with_id_generator(UuidV4Generator);
//!
//! // INSERT INTO `users` (name, id, createdAt, updatedAt) VALUES (?, ?, ?, ?), (?, ?, ?, ?)
//! db.insert_bulk(
//!     "users",
//!     vec![Row::new().set("name", "Ann"), Row::new().set("name", "Bo")],
//!     false,
//! )
//! .await?;
//!
//! // UPDATE `users` SET name = CASE WHEN (id=?) THEN ? ... ELSE name END, ... WHERE (id=?) OR (id=?)
//! db.update_bulk(
//!     "users",
//!     vec![
//!         Row::new().set("id", 1).set("name", "Ann"),
//!         Row::new().set("id", 2).set("name", "Bo"),
//!     ],
//! )
//! .await?;
//!
//! // DELETE FROM `users` WHERE id IN (?, ?)
//! db.delete_bulk("users", [1, 2]).await?;
//! ```

pub mod classify;
pub mod config;
pub mod context;
pub mod defaults;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expand;
pub mod hydrate;
pub mod ident;
pub mod manager;
pub mod plan;
pub mod prelude;
pub mod row;
pub mod value;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use classify::{ErrorClassifier, GenericClassifier, MySqlErrorClassifier, classifier_for};
pub use config::{ManagerConfig, RowShapePolicy};
pub use context::CallContext;
pub use defaults::{Clock, FixedClock, IdGenerator, SystemClock, UuidV4Generator};
pub use dialect::{Backend, Dialect, MySqlDialect};
pub use error::{BackendError, DbalError, DbalResult};
pub use executor::Executor;
pub use expand::ParamStream;
pub use hydrate::{FromResultRow, ResultRow};
pub use manager::{DbalManager, MutationKind, MutationStage};
pub use plan::{PredicateKey, UpdateBulkPlan, UpdatePlan};
pub use row::{ReplaceRule, Row};
pub use value::{BindType, BindValue, FieldValue, Param};

#[cfg(feature = "mysql")]
pub use mysql::MySqlExecutor;
