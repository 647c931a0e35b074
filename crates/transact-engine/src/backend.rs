//! Backend driver interface.
//!
//! The engine speaks to any DBMS through this minimal query/exec
//! trait. Parameter values are already dialect-shaped by the time they
//! arrive: SQL text carries the dialect's placeholders and `params`
//! lines up with them in order.

use async_trait::async_trait;
use transact_core::Value;

use crate::error::Result;

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOutput {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Row data decoded into engine values.
    pub rows: Vec<Vec<Value>>,
}

/// Outcome of a non-query statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutput {
    /// Rows affected.
    pub rows_affected: u64,
    /// Identity of the inserted row, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// A minimal asynchronous database driver.
///
/// Implementations wrap their native errors into
/// [`EngineError::Backend`](crate::error::EngineError::Backend),
/// preserving the original message.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Runs a row-returning statement.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryOutput>;

    /// Runs a non-row-returning statement.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecOutput>;

    /// Starts a transaction.
    async fn begin(&self) -> Result<()>;

    /// Commits the current transaction.
    async fn commit(&self) -> Result<()>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> Result<()>;
}
