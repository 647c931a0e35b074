//! Abstract syntax tree types for T-SQL programs.

mod expression;
mod statement;
mod types;

pub use expression::{BinaryOp, Expr, FunctionCall, Literal, UnaryOp};
pub use statement::{
    statement_kind, Assignment, CommonTableExpr, CreateProcedureStatement, CreateTableStatement,
    CursorKind, CursorLock, CursorScope, DeclareCursorStatement, DeclareItem, DeleteStatement,
    ExecParameter, ExecuteStatement, FetchDirection, FetchStatement, IfStatement, InsertSource,
    InsertStatement, JoinClause, JoinType, OrderBy, OrderDirection, Program, RaiserrorStatement,
    SelectColumn, SelectStatement, Statement, TableRef, ThrowArgs, TryCatchStatement,
    UpdateStatement, WhileStatement, WithStatement,
};
pub use types::{ColumnDef, DataType, IdentitySpec, ProcedureParam};
