//! Execution results.

use transact_core::Value;

use crate::error::SqlError;

/// One tabular result: ordered column names plus ordered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Rows; every row has one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates an empty result set with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the first cell of the first row, if any.
    #[must_use]
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// The outcome of running a batch: every result set produced, in
/// order, plus the counters T-SQL exposes.
///
/// On failure the result still carries everything produced before the
/// error; callers must tolerate partial result sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionResult {
    /// Result sets in production order, including those appended by
    /// nested procedure calls.
    pub result_sets: Vec<ResultSet>,
    /// Cumulative rows affected by DML across the batch.
    pub rows_affected: u64,
    /// Identity value of the most recent insert, if any.
    pub last_insert_id: Option<i64>,
    /// Procedure RETURN value, if a RETURN with a value ran.
    pub return_value: Option<i32>,
    /// The uncaught error that ended the batch, if any.
    pub error: Option<SqlError>,
}

impl ExecutionResult {
    /// Returns the first result set, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ResultSet> {
        self.result_sets.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let mut rs = ResultSet::new(vec![String::from("n")]);
        assert!(rs.scalar().is_none());
        rs.rows.push(vec![Value::int(7)]);
        assert_eq!(rs.scalar(), Some(&Value::int(7)));
    }
}
