//! Convenient imports for typical `dbal-bulk` usage.
//!
//! ```ignore
//! use dbal_bulk::prelude::*;
//! ```

pub use crate::{
    CallContext, DbalError, DbalManager, DbalResult, Executor, FieldValue, FromResultRow,
    ManagerConfig, ReplaceRule, ResultRow, Row, RowShapePolicy, UuidV4Generator,
};

#[cfg(feature = "mysql")]
pub use crate::MySqlExecutor;
