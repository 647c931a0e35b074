//! Session execution context.
//!
//! One [`ExecutionContext`] is one T-SQL session: its variables, temp
//! tables, cursors, transaction depth, and error state. Nested
//! procedure calls share the caller's context; only the interpreter
//! wrapper changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use transact_core::{SqlType, Value};

use crate::cursor::CursorStore;
use crate::environment::VariableEnvironment;
use crate::error::SqlError;
use crate::temp_table::TempTableStore;

/// Informational `@@VERSION` string.
const VERSION_STRING: &str = concat!(
    "transact T-SQL runtime ",
    env!("CARGO_PKG_VERSION")
);

/// Cooperative cancellation handle.
///
/// The interpreter checks the token at every statement boundary and
/// stops with a cancellation error once it is set. Mid-statement
/// cancellation is whatever the backend honors.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Error-handling state: TRY depth, the error being handled by the
/// innermost CATCH, and the last error recorded for `@@ERROR`.
#[derive(Debug, Clone, Default)]
pub struct ErrorState {
    /// Number of TRY scopes currently active.
    pub try_depth: u32,
    /// The error the innermost active CATCH block is handling; feeds
    /// `ERROR_MESSAGE()` and friends.
    pub catch_error: Option<SqlError>,
    /// Most recent error, caught or not.
    pub last_error: Option<SqlError>,
}

/// A single session's mutable state.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Session variables, including the `@@` system variables.
    pub variables: VariableEnvironment,
    /// Session temp tables and table variables.
    pub temp_tables: TempTableStore,
    /// Session cursors.
    pub cursors: CursorStore,
    /// Error-handling state.
    pub errors: ErrorState,
    /// Open transaction depth (`@@TRANCOUNT`).
    pub transaction_depth: u32,
    /// Set by RETURN; stops the enclosing body.
    pub has_returned: bool,
    /// RETURN value, if one was given.
    pub return_value: Option<i32>,
    /// Cooperative cancellation token.
    pub cancel: CancelToken,
}

impl ExecutionContext {
    /// Creates a fresh session context with its system variables
    /// seeded.
    #[must_use]
    pub fn new() -> Self {
        let mut ctx = Self::default();
        ctx.variables.set("@@ROWCOUNT", Value::bigint(0));
        ctx.variables.set("@@ERROR", Value::int(0));
        ctx.variables.set("@@FETCH_STATUS", Value::int(0));
        ctx.variables
            .set("@@IDENTITY", Value::null_of(SqlType::BigInt));
        ctx.variables.set("@@VERSION", Value::nvarchar(VERSION_STRING));
        ctx.variables.set("@@NESTLEVEL", Value::int(0));
        ctx.variables.set("@@TRANCOUNT", Value::int(0));
        ctx
    }

    /// Records rows affected by the most recent statement.
    pub fn set_row_count(&mut self, count: u64) {
        self.variables
            .set("@@ROWCOUNT", Value::bigint(i64::try_from(count).unwrap_or(i64::MAX)));
    }

    /// Records the last error number (0 = success) for `@@ERROR`.
    pub fn set_error_number(&mut self, number: i32) {
        self.variables.set("@@ERROR", Value::int(i64::from(number)));
    }

    /// Records the most recent cursor fetch outcome.
    pub fn set_fetch_status(&mut self, status: i32) {
        self.variables
            .set("@@FETCH_STATUS", Value::int(i64::from(status)));
    }

    /// Records the identity value produced by the most recent insert.
    pub fn set_identity(&mut self, id: i64) {
        self.variables.set("@@IDENTITY", Value::bigint(id));
    }

    /// Records the current procedure nesting depth.
    pub fn set_nest_level(&mut self, level: u32) {
        self.variables
            .set("@@NESTLEVEL", Value::int(i64::from(level)));
    }

    /// Records the open transaction count.
    pub fn set_trancount(&mut self, count: u32) {
        self.variables
            .set("@@TRANCOUNT", Value::int(i64::from(count)));
    }

    /// Adopts an in-progress transaction started outside the
    /// interpreter: the session's depth and `@@TRANCOUNT` follow it,
    /// and COMMIT/ROLLBACK statements will act on it.
    pub fn set_transaction_depth(&mut self, depth: u32) {
        self.transaction_depth = depth;
        self.set_trancount(depth);
    }

    /// Captures an error: updates `@@ERROR` and the last-error state.
    pub fn record_error(&mut self, error: SqlError) {
        self.set_error_number(error.number);
        self.errors.last_error = Some(error);
    }

    /// Clears the error state at the start of a successful statement.
    pub fn clear_error_number(&mut self) {
        self.set_error_number(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_variables_seeded() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.variables.get("@@ROWCOUNT"), Some(&Value::bigint(0)));
        assert_eq!(ctx.variables.get("@@error"), Some(&Value::int(0)));
        assert!(ctx.variables.get("@@IDENTITY").unwrap().is_null());
        assert!(!ctx.variables.get("@@VERSION").unwrap().is_null());
    }

    #[test]
    fn test_record_error_updates_at_at_error() {
        let mut ctx = ExecutionContext::new();
        ctx.record_error(SqlError::raised(50000, "x", 16, 1));
        assert_eq!(ctx.variables.get("@@ERROR"), Some(&Value::int(50000)));
        assert!(ctx.errors.last_error.is_some());
    }

    #[test]
    fn test_adopted_transaction_depth() {
        let mut ctx = ExecutionContext::new();
        ctx.set_transaction_depth(2);
        assert_eq!(ctx.transaction_depth, 2);
        assert_eq!(ctx.variables.get("@@TRANCOUNT"), Some(&Value::int(2)));
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
