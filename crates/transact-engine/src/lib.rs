//! # transact-engine
//!
//! The execution core of the `transact` T-SQL runtime: a tree-walking
//! interpreter over a parsed T-SQL program, running against any
//! backend that implements the [`backend::Backend`] driver trait.
//!
//! The engine maintains one [`context::ExecutionContext`] per session
//! (variables, temp tables, cursors, transaction depth, error state),
//! evaluates expressions locally, serves `#temp` / `@tablevar` DML
//! from an in-memory store, translates everything backend-bound into
//! the target [`transact_core::Dialect`], and implements nested
//! procedure execution with OUTPUT propagation and a recursion guard.
//!
//! Out of scope here: the backend drivers themselves (see the
//! `transact-sqlite` crate for the SQLite one) and procedure source
//! storage (hosts supply a [`resolver::ProcedureResolver`]).

pub mod backend;
pub mod context;
pub mod cursor;
pub mod ddl;
pub mod environment;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod normalizer;
pub mod resolver;
pub mod result;
pub mod rewriter;
pub mod temp_table;

pub use backend::{Backend, ExecOutput, QueryOutput};
pub use context::{CancelToken, ExecutionContext};
pub use error::{EngineError, Result, SqlError};
pub use interpreter::{Interpreter, MAX_NESTING_LEVEL, WHILE_ITERATION_CAP};
pub use resolver::{MemoryResolver, ProcedureResolver, ResolvedProcedure};
pub use result::{ExecutionResult, ResultSet};
