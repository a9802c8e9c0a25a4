//! Diagnostic call context rendered as a leading SQL comment.
//!
//! The comment names the entry point (controller, command, job) and the
//! application caller so slow-query logs can be traced back to code:
//!
//! ```text
//! /* {"entryPointController":"OrderController::create","applicationCaller":"OrderService::place"} */ INSERT ...
//! ```

use serde::Serialize;

/// Who issued a statement. Passed explicitly; nothing is read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallContext {
    #[serde(rename = "entryPointController")]
    pub entry_point: String,
    #[serde(rename = "applicationCaller")]
    pub caller: String,
}

impl CallContext {
    pub fn new(entry_point: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
            caller: caller.into(),
        }
    }

    /// Set the entry point.
    pub fn entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Set the application caller.
    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = caller.into();
        self
    }

    /// Prefix `sql` with this context as a JSON comment.
    ///
    /// Falls back to the bare SQL if the comment cannot be rendered or would
    /// contain a comment terminator.
    pub fn annotate(&self, sql: &str) -> String {
        match serde_json::to_string(self) {
            Ok(json) if !json.contains("*/") => format!("/* {json} */ {sql}"),
            _ => sql.to_string(),
        }
    }
}
