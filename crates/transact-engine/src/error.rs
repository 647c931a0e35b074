//! Error types for the execution engine.

use core::fmt;

use transact_core::value::ValueError;
use transact_core::ParseError;

use crate::interpreter::{MAX_NESTING_LEVEL, WHILE_ITERATION_CAP};

/// A T-SQL-shaped error record: what `@@ERROR`, `ERROR_MESSAGE()`, and
/// the CATCH context observe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlError {
    /// Error number (`@@ERROR`, `ERROR_NUMBER()`).
    pub number: i32,
    /// Error message text.
    pub message: String,
    /// Severity (16+ aborts the statement).
    pub severity: i32,
    /// Error state.
    pub state: i32,
    /// 1-based source line, when known.
    pub line: u32,
    /// Procedure name, when raised inside one.
    pub procedure: String,
}

impl SqlError {
    /// Creates a user-raised error (`RAISERROR` / `THROW`).
    #[must_use]
    pub fn raised(number: i32, message: impl Into<String>, severity: i32, state: i32) -> Self {
        Self {
            number,
            message: message.into(),
            severity,
            state,
            line: 0,
            procedure: String::new(),
        }
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Msg {}, Level {}, State {}: {}",
            self.number, self.severity, self.state, self.message
        )
    }
}

/// Errors produced by the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The embedded parser rejected the batch or a nested SQL string.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend driver reported an error; the original message is
    /// preserved.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Statement variant the interpreter does not implement.
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// Temp table, table variable, cursor, or column not found.
    #[error("Unknown object '{0}'")]
    UndefinedObject(String),

    /// A referenced `@variable` has never been declared.
    #[error("Must declare the scalar variable \"{0}\"")]
    UndefinedVariable(String),

    /// A required procedure parameter was not supplied.
    #[error("Procedure '{procedure}' expects parameter '{parameter}', which was not supplied")]
    MissingRequiredParameter {
        /// The procedure being called.
        procedure: String,
        /// The missing parameter.
        parameter: String,
    },

    /// More arguments than declared parameters.
    #[error("Procedure '{0}' has too many arguments specified")]
    TooManyParameters(String),

    /// A named argument does not match any declared parameter, or an
    /// OUTPUT argument is not a variable reference.
    #[error("'{0}' is not a valid parameter reference")]
    InvalidParameterRef(String),

    /// Procedure recursion guard.
    #[error("Maximum stored procedure nesting level exceeded (limit {MAX_NESTING_LEVEL})")]
    NestingLimitExceeded,

    /// EXEC of a named procedure without a configured resolver.
    #[error("Cannot execute procedure '{0}': no procedure resolver configured")]
    NoResolverConfigured(String),

    /// RAISERROR with severity >= 16.
    #[error("{0}")]
    Raised(SqlError),

    /// User THROW.
    #[error("{0}")]
    Thrown(SqlError),

    /// FETCH direction not valid for the cursor.
    #[error("Fetch direction {0} is not supported by cursor '{1}'")]
    InvalidCursorDirection(String, String),

    /// Cursor operation on a cursor that is not open.
    #[error("Cursor '{0}' is not open")]
    CursorNotOpen(String),

    /// Evaluator errors: type mismatch, divide by zero, invalid cast.
    #[error("{0}")]
    Value(#[from] ValueError),

    /// WHILE iteration safety cap.
    #[error("WHILE loop exceeded {WHILE_ITERATION_CAP} iterations")]
    LoopLimitExceeded,

    /// Execution was cancelled; never caught by CATCH.
    #[error("Execution cancelled")]
    Cancelled,
}

impl EngineError {
    /// Classifies the error into the `SqlError` shape recorded in
    /// `@@ERROR` and the CATCH context. Numbers follow the T-SQL
    /// originals where one exists; everything else gets the
    /// user-error number 50000.
    #[must_use]
    pub fn to_sql_error(&self) -> SqlError {
        match self {
            Self::Raised(e) | Self::Thrown(e) => e.clone(),
            Self::Value(ValueError::DivideByZero) => {
                SqlError::raised(8134, self.to_string(), 16, 1)
            }
            Self::Value(ValueError::InvalidCast { .. }) => {
                SqlError::raised(245, self.to_string(), 16, 1)
            }
            Self::Value(ValueError::TypeMismatch { .. }) => {
                SqlError::raised(206, self.to_string(), 16, 1)
            }
            Self::NestingLimitExceeded => SqlError::raised(217, self.to_string(), 16, 1),
            Self::UndefinedVariable(_) => SqlError::raised(137, self.to_string(), 15, 1),
            Self::UndefinedObject(_) => SqlError::raised(208, self.to_string(), 16, 1),
            Self::MissingRequiredParameter { .. } => {
                SqlError::raised(201, self.to_string(), 16, 1)
            }
            _ => SqlError::raised(50000, self.to_string(), 16, 1),
        }
    }

    /// Whether a CATCH block may handle this error. Cancellation
    /// always unwinds.
    #[must_use]
    pub const fn is_catchable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<ParseError> for EngineError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide_by_zero_classification() {
        let err = EngineError::Value(ValueError::DivideByZero);
        let sql = err.to_sql_error();
        assert_eq!(sql.number, 8134);
        assert_eq!(sql.severity, 16);
    }

    #[test]
    fn test_raised_error_keeps_fields() {
        let err = EngineError::Raised(SqlError::raised(50000, "x", 16, 1));
        let sql = err.to_sql_error();
        assert_eq!(sql.number, 50000);
        assert_eq!(sql.message, "x");
    }

    #[test]
    fn test_cancelled_is_not_catchable() {
        assert!(!EngineError::Cancelled.is_catchable());
        assert!(EngineError::LoopLimitExceeded.is_catchable());
    }
}
