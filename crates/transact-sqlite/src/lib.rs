//! # transact-sqlite
//!
//! SQLite implementation of the `transact` engine's backend driver
//! trait, over a `sqlx` connection pool.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transact_core::Dialect;
//! use transact_engine::{ExecutionContext, Interpreter};
//! use transact_sqlite::SqliteBackend;
//!
//! # async fn demo() -> transact_engine::Result<()> {
//! let backend = Arc::new(SqliteBackend::connect(":memory:").await?);
//! let mut interpreter = Interpreter::new(backend, Dialect::Sqlite);
//! let mut ctx = ExecutionContext::new();
//! let result = interpreter
//!     .execute(&mut ctx, "DECLARE @x INT = 2 SELECT @x * 21 AS answer", &[])
//!     .await;
//! assert!(result.error.is_none());
//! # Ok(())
//! # }
//! ```

mod backend;

pub use backend::SqliteBackend;
