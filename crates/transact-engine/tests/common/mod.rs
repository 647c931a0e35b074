#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use transact_core::{Dialect, Value};
use transact_engine::{
    Backend, EngineError, ExecOutput, ExecutionContext, ExecutionResult, Interpreter, QueryOutput,
    Result,
};

/// A scriptable backend that records every statement it receives.
#[derive(Debug, Default)]
pub struct MockBackend {
    /// SQL text received, in order, with its parameter values.
    pub log: Mutex<Vec<(String, Vec<Value>)>>,
    /// Scripted responses for `query`, popped in order; an empty
    /// queue yields empty result sets.
    pub query_results: Mutex<VecDeque<QueryOutput>>,
    /// Rows-affected reported by `execute`.
    pub rows_affected: u64,
    /// Identity value reported by `execute`.
    pub last_insert_id: Option<i64>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            rows_affected: 1,
            last_insert_id: Some(42),
            ..Self::default()
        }
    }

    /// Queues a one-column result set.
    pub fn push_rows(&self, column: &str, rows: Vec<Value>) {
        self.query_results
            .lock()
            .unwrap()
            .push_back(QueryOutput {
                columns: vec![String::from(column)],
                rows: rows.into_iter().map(|v| vec![v]).collect(),
            });
    }

    /// Every SQL string sent to the backend.
    pub fn sent(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    /// Parameters of the `i`-th statement sent.
    pub fn params(&self, i: usize) -> Vec<Value> {
        self.log.lock().unwrap()[i].1.clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryOutput> {
        self.log
            .lock()
            .unwrap()
            .push((String::from(sql), params.to_vec()));
        Ok(self
            .query_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecOutput> {
        self.log
            .lock()
            .unwrap()
            .push((String::from(sql), params.to_vec()));
        Ok(ExecOutput {
            rows_affected: self.rows_affected,
            last_insert_id: self.last_insert_id,
        })
    }

    async fn begin(&self) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((String::from("BEGIN"), vec![]));
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((String::from("COMMIT"), vec![]));
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((String::from("ROLLBACK"), vec![]));
        Ok(())
    }
}

/// A backend that fails every call; used to prove statements never
/// reach it.
#[derive(Debug, Default)]
pub struct UnreachableBackend;

#[async_trait]
impl Backend for UnreachableBackend {
    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryOutput> {
        Err(EngineError::Backend(format!("unexpected backend query: {sql}")))
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<ExecOutput> {
        Err(EngineError::Backend(format!(
            "unexpected backend execute: {sql}"
        )))
    }

    async fn begin(&self) -> Result<()> {
        Err(EngineError::Backend(String::from("unexpected begin")))
    }

    async fn commit(&self) -> Result<()> {
        Err(EngineError::Backend(String::from("unexpected commit")))
    }

    async fn rollback(&self) -> Result<()> {
        Err(EngineError::Backend(String::from("unexpected rollback")))
    }
}

/// An interpreter over a mock backend plus a fresh context.
pub fn mock_session() -> (Arc<MockBackend>, Interpreter, ExecutionContext) {
    let backend = Arc::new(MockBackend::new());
    let interpreter = Interpreter::new(backend.clone(), Dialect::Sqlite);
    (backend, interpreter, ExecutionContext::new())
}

/// An interpreter whose backend rejects every call.
pub fn isolated_session() -> (Interpreter, ExecutionContext) {
    let interpreter = Interpreter::new(Arc::new(UnreachableBackend), Dialect::Sqlite);
    (interpreter, ExecutionContext::new())
}

/// Runs a batch and panics on an uncaught error.
pub async fn run_ok(
    interpreter: &mut Interpreter,
    ctx: &mut ExecutionContext,
    sql: &str,
) -> ExecutionResult {
    let result = interpreter.execute(ctx, sql, &[]).await;
    assert!(
        result.error.is_none(),
        "Batch failed: {sql}\nError: {:?}",
        result.error
    );
    result
}

/// Renders a result set's rows as strings for compact assertions.
pub fn rows_as_strings(result: &ExecutionResult, index: usize) -> Vec<Vec<String>> {
    result.result_sets[index]
        .rows
        .iter()
        .map(|row| row.iter().map(Value::as_string).collect())
        .collect()
}
