//! T-SQL statement AST types.

use core::fmt;

use super::expression::Expr;
use super::types::{ColumnDef, DataType, ProcedureParam};

/// A parsed batch: the unit handed to the interpreter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The table to join.
    pub table: TableRef,
    /// The join condition (absent for CROSS joins).
    pub on: Option<Expr>,
}

/// A table reference in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A simple table name (may be a `#temp` or `@tablevar` name).
    Table {
        /// Schema name (optional).
        schema: Option<String>,
        /// Table name.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Alias (required for derived tables).
        alias: String,
    },
    /// A joined table.
    Join {
        /// Left side of the join.
        left: Box<TableRef>,
        /// The join clause.
        join: Box<JoinClause>,
    },
}

impl TableRef {
    /// Creates a simple table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Returns the base table name if this is a plain (non-join,
    /// non-derived) reference.
    #[must_use]
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::Table { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A column in a SELECT list.
///
/// `assign_to` carries the `@var` name for T-SQL assignment columns
/// (`SELECT @v = expr`); such statements never reach the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<String>,
    /// Assignment target variable (with `@` prefix), if any.
    pub assign_to: Option<String>,
}

impl SelectColumn {
    /// Creates a plain select column.
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            alias: None,
            assign_to: None,
        }
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// TOP row-count expression, as written in T-SQL source.
    pub top: Option<Expr>,
    /// The select list.
    pub columns: Vec<SelectColumn>,
    /// `INTO #target` table name, if present.
    pub into: Option<String>,
    /// The FROM clause.
    pub from: Option<TableRef>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// Row-limit slot. Never produced by the parser; the dialect
    /// rewriter moves TOP here for LIMIT-style backends.
    pub fetch: Option<Expr>,
}

impl SelectStatement {
    /// Returns true if any select column is a variable assignment.
    #[must_use]
    pub fn is_assignment(&self) -> bool {
        self.columns.iter().any(|c| c.assign_to.is_some())
    }
}

/// Source of data for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES (...), (...), ...
    Values(Vec<Vec<Expr>>),
    /// INSERT ... SELECT ...
    Query(Box<SelectStatement>),
    /// DEFAULT VALUES
    DefaultValues,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Schema name.
    pub schema: Option<String>,
    /// Table name (may be a `#temp` or `@tablevar` name).
    pub table: String,
    /// Column names (optional).
    pub columns: Vec<String>,
    /// Values to insert.
    pub source: InsertSource,
}

/// An assignment in UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name.
    pub column: String,
    /// Value expression.
    pub value: Expr,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Schema name.
    pub schema: Option<String>,
    /// Table name (may be a `#temp` or `@tablevar` name).
    pub table: String,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Schema name.
    pub schema: Option<String>,
    /// Table name (may be a `#temp` or `@tablevar` name).
    pub table: String,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// One common table expression of a WITH statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpr {
    /// CTE name.
    pub name: String,
    /// Optional explicit column list.
    pub columns: Vec<String>,
    /// The CTE body.
    pub query: SelectStatement,
}

/// A WITH (CTE-rooted) statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// The common table expressions, in declaration order.
    pub ctes: Vec<CommonTableExpr>,
    /// The statement the CTEs scope over.
    pub body: Box<Statement>,
}

/// A single DECLARE item.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclareItem {
    /// Scalar variable: `DECLARE @v INT = 1`.
    Scalar {
        /// Variable name with `@` prefix.
        name: String,
        /// Declared type.
        data_type: DataType,
        /// Optional initializer.
        init: Option<Expr>,
    },
    /// Table variable: `DECLARE @t TABLE (...)`.
    Table {
        /// Variable name with `@` prefix.
        name: String,
        /// Column definitions.
        columns: Vec<ColumnDef>,
    },
}

/// A CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name (may be a `#temp` name).
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
}

/// A CREATE PROCEDURE statement.
///
/// Doubles as the execution entry point: a resolved procedure source
/// parses to this variant and the interpreter runs its body directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProcedureStatement {
    /// Procedure name.
    pub name: String,
    /// Declared parameters in order.
    pub params: Vec<ProcedureParam>,
    /// Procedure body.
    pub body: Vec<Statement>,
}

/// An argument at an EXEC call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecParameter {
    /// Parameter name (`@p = expr` form), if named.
    pub name: Option<String>,
    /// The argument value expression.
    pub value: Expr,
    /// Whether OUTPUT was specified.
    pub output: bool,
}

/// The three EXEC forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteStatement {
    /// `EXEC(@sql)` — dynamic SQL.
    DynamicSql(Expr),
    /// `EXEC name @p = v, ...` — named procedure call. Also carries
    /// `sp_executesql`, which the interpreter special-cases.
    Procedure {
        /// Procedure name.
        name: String,
        /// Call-site arguments.
        params: Vec<ExecParameter>,
    },
}

/// THROW with explicit arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowArgs {
    /// Error number.
    pub number: Expr,
    /// Error message.
    pub message: Expr,
    /// Error state.
    pub state: Expr,
}

/// A RAISERROR statement.
#[derive(Debug, Clone, PartialEq)]
pub struct RaiserrorStatement {
    /// Message text or message expression.
    pub message: Expr,
    /// Severity expression.
    pub severity: Expr,
    /// State expression.
    pub state: Expr,
    /// Optional substitution arguments.
    pub args: Vec<Expr>,
}

/// Cursor scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorScope {
    /// Visible to the whole session.
    #[default]
    Global,
    /// Local to the declaring batch.
    Local,
}

/// Cursor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    /// Forward-only (default).
    #[default]
    ForwardOnly,
    /// Static snapshot.
    Static,
    /// Keyset-driven.
    Keyset,
    /// Dynamic.
    Dynamic,
    /// Fast-forward (forward-only, read-only).
    FastForward,
}

/// Cursor lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorLock {
    /// No explicit lock clause.
    #[default]
    Unspecified,
    /// READ_ONLY.
    ReadOnly,
    /// SCROLL_LOCKS.
    ScrollLocks,
    /// OPTIMISTIC.
    Optimistic,
}

/// A DECLARE CURSOR statement.
///
/// The query text is captured verbatim; `@var` substitution happens at
/// OPEN time so late-bound variables take their OPEN-time values.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareCursorStatement {
    /// Cursor name.
    pub name: String,
    /// The cursor query, verbatim source text.
    pub query: String,
    /// Scope (GLOBAL / LOCAL).
    pub scope: CursorScope,
    /// Cursor type.
    pub kind: CursorKind,
    /// Whether SCROLL was specified.
    pub scroll: bool,
    /// Lock mode.
    pub lock: CursorLock,
}

/// FETCH direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchDirection {
    /// FETCH NEXT (default).
    #[default]
    Next,
    /// FETCH PRIOR.
    Prior,
    /// FETCH FIRST.
    First,
    /// FETCH LAST.
    Last,
    /// FETCH ABSOLUTE n (1-based; negative counts from the end).
    Absolute(i64),
    /// FETCH RELATIVE n (signed offset from current).
    Relative(i64),
}

/// A FETCH statement.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchStatement {
    /// Direction.
    pub direction: FetchDirection,
    /// Cursor name.
    pub cursor: String,
    /// INTO variable names (with `@` prefix), assigned in column order.
    pub into: Vec<String>,
}

/// An IF statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// Condition.
    pub condition: Expr,
    /// Statement executed when the condition is truthy.
    pub then_branch: Box<Statement>,
    /// ELSE branch.
    pub else_branch: Option<Box<Statement>>,
}

/// A WHILE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// Loop condition.
    pub condition: Expr,
    /// Loop body.
    pub body: Box<Statement>,
}

/// A BEGIN TRY / BEGIN CATCH construct.
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchStatement {
    /// Statements in the TRY block.
    pub try_block: Vec<Statement>,
    /// Statements in the CATCH block.
    pub catch_block: Vec<Statement>,
}

/// A T-SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT statement.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// WITH (CTE-rooted) statement.
    With(WithStatement),
    /// DECLARE of scalar and table variables.
    Declare(Vec<DeclareItem>),
    /// SET @var = expr.
    SetVariable {
        /// Variable name with `@` prefix.
        name: String,
        /// Value expression.
        value: Expr,
    },
    /// Session option (`SET NOCOUNT ON`); accepted and ignored.
    SetOption {
        /// Option name, uppercased.
        option: String,
        /// Whether the option was turned ON.
        enabled: bool,
    },
    /// PRINT statement.
    Print(Expr),
    /// IF / ELSE.
    If(IfStatement),
    /// WHILE loop.
    While(WhileStatement),
    /// BEGIN ... END block.
    Block(Vec<Statement>),
    /// BREAK inside a WHILE loop.
    Break,
    /// CONTINUE inside a WHILE loop.
    Continue,
    /// RETURN with optional integer expression.
    Return(Option<Expr>),
    /// BEGIN TRY / BEGIN CATCH.
    TryCatch(TryCatchStatement),
    /// THROW, bare (re-raise) or with arguments.
    Throw(Option<ThrowArgs>),
    /// RAISERROR.
    Raiserror(RaiserrorStatement),
    /// EXEC in any of its forms.
    Execute(ExecuteStatement),
    /// CREATE TABLE.
    CreateTable(CreateTableStatement),
    /// DROP TABLE.
    DropTable {
        /// Table name.
        name: String,
    },
    /// TRUNCATE TABLE.
    TruncateTable {
        /// Table name.
        name: String,
    },
    /// CREATE PROCEDURE.
    CreateProcedure(CreateProcedureStatement),
    /// BEGIN TRANSACTION.
    BeginTransaction,
    /// COMMIT TRANSACTION.
    CommitTransaction,
    /// ROLLBACK TRANSACTION.
    RollbackTransaction,
    /// DECLARE ... CURSOR FOR ...
    DeclareCursor(DeclareCursorStatement),
    /// OPEN cursor.
    OpenCursor {
        /// Cursor name.
        name: String,
    },
    /// FETCH from cursor.
    Fetch(FetchStatement),
    /// CLOSE cursor.
    CloseCursor {
        /// Cursor name.
        name: String,
    },
    /// DEALLOCATE cursor.
    DeallocateCursor {
        /// Cursor name.
        name: String,
    },
}

// ===================================================================
// Display implementations (SQL text emission for backend-bound
// statements)
// ===================================================================

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expr, self.direction.as_str())
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.join_type.as_str(), self.table)?;
        if let Some(on) = &self.on {
            write!(f, " ON {on}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table {
                schema,
                name,
                alias,
            } => {
                if let Some(s) = schema {
                    write!(f, "{s}.")?;
                }
                write!(f, "{name}")?;
                if let Some(a) = alias {
                    write!(f, " AS {a}")?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => {
                write!(f, "({query}) AS {alias}")
            }
            Self::Join { left, join } => {
                write!(f, "{left} {join}")
            }
        }
    }
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(target) = &self.assign_to {
            write!(f, "{target} = ")?;
        }
        write!(f, "{}", self.expr)?;
        if let Some(a) = &self.alias {
            write!(f, " AS {a}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT")?;
        if self.distinct {
            write!(f, " DISTINCT")?;
        }
        if let Some(top) = &self.top {
            write!(f, " TOP {top}")?;
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {col}")?;
        }
        if let Some(into) = &self.into {
            write!(f, " INTO {into}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(w) = &self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY")?;
            for (i, g) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {g}")?;
            }
        }
        if let Some(h) = &self.having {
            write!(f, " HAVING {h}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY")?;
            for (i, o) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {o}")?;
            }
        }
        if let Some(n) = &self.fetch {
            write!(f, " LIMIT {n}")?;
        }
        Ok(())
    }
}

impl fmt::Display for InsertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(rows) => {
                write!(f, "VALUES")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " (")?;
                    for (j, val) in row.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{val}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Self::Query(q) => write!(f, "{q}"),
            Self::DefaultValues => write!(f, "DEFAULT VALUES"),
        }
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO ")?;
        if let Some(s) = &self.schema {
            write!(f, "{s}.")?;
        }
        write!(f, "{}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{col}")?;
            }
            write!(f, ")")?;
        }
        write!(f, " {}", self.source)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE ")?;
        if let Some(s) = &self.schema {
            write!(f, "{s}.")?;
        }
        write!(f, "{} SET", self.table)?;
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {a}")?;
        }
        if let Some(w) = &self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM ")?;
        if let Some(s) = &self.schema {
            write!(f, "{s}.")?;
        }
        write!(f, "{}", self.table)?;
        if let Some(w) = &self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        Ok(())
    }
}

impl fmt::Display for WithStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WITH ")?;
        for (i, cte) in self.ctes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cte.name)?;
            if !cte.columns.is_empty() {
                write!(f, " (")?;
                for (j, col) in cte.columns.iter().enumerate() {
                    if j > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{col}")?;
                }
                write!(f, ")")?;
            }
            write!(f, " AS ({})", cte.query)?;
        }
        write!(f, " {}", self.body)
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE {} (", self.name)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", col.name, col.data_type)?;
            if let Some(id) = &col.identity {
                write!(f, " IDENTITY({}, {})", id.seed, id.increment)?;
            }
            if col.primary_key {
                write!(f, " PRIMARY KEY")?;
            } else if !col.nullable {
                write!(f, " NOT NULL")?;
            }
            if let Some(default) = &col.default {
                write!(f, " DEFAULT {default}")?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for Statement {
    /// Renders the backend-translatable statements back to SQL text.
    ///
    /// Control-flow statements are interpreted, never shipped to a
    /// backend; their rendering is a debug aid only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(i) => write!(f, "{i}"),
            Self::Update(u) => write!(f, "{u}"),
            Self::Delete(d) => write!(f, "{d}"),
            Self::With(w) => write!(f, "{w}"),
            Self::CreateTable(c) => write!(f, "{c}"),
            Self::DropTable { name } => write!(f, "DROP TABLE {name}"),
            Self::TruncateTable { name } => write!(f, "TRUNCATE TABLE {name}"),
            Self::Print(e) => write!(f, "PRINT {e}"),
            Self::SetVariable { name, value } => write!(f, "SET {name} = {value}"),
            Self::BeginTransaction => write!(f, "BEGIN TRANSACTION"),
            Self::CommitTransaction => write!(f, "COMMIT TRANSACTION"),
            Self::RollbackTransaction => write!(f, "ROLLBACK TRANSACTION"),
            other => write!(f, "<{}>", statement_kind(other)),
        }
    }
}

/// A short name for a statement variant, used in diagnostics.
#[must_use]
pub fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Select(_) => "SELECT",
        Statement::Insert(_) => "INSERT",
        Statement::Update(_) => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::With(_) => "WITH",
        Statement::Declare(_) => "DECLARE",
        Statement::SetVariable { .. } | Statement::SetOption { .. } => "SET",
        Statement::Print(_) => "PRINT",
        Statement::If(_) => "IF",
        Statement::While(_) => "WHILE",
        Statement::Block(_) => "BEGIN",
        Statement::Break => "BREAK",
        Statement::Continue => "CONTINUE",
        Statement::Return(_) => "RETURN",
        Statement::TryCatch(_) => "TRY",
        Statement::Throw(_) => "THROW",
        Statement::Raiserror(_) => "RAISERROR",
        Statement::Execute(_) => "EXEC",
        Statement::CreateTable(_) => "CREATE TABLE",
        Statement::DropTable { .. } => "DROP TABLE",
        Statement::TruncateTable { .. } => "TRUNCATE TABLE",
        Statement::CreateProcedure(_) => "CREATE PROCEDURE",
        Statement::BeginTransaction => "BEGIN TRANSACTION",
        Statement::CommitTransaction => "COMMIT TRANSACTION",
        Statement::RollbackTransaction => "ROLLBACK TRANSACTION",
        Statement::DeclareCursor(_) => "DECLARE CURSOR",
        Statement::OpenCursor { .. } => "OPEN",
        Statement::Fetch(_) => "FETCH",
        Statement::CloseCursor { .. } => "CLOSE",
        Statement::DeallocateCursor { .. } => "DEALLOCATE",
    }
}
