//! T-SQL parser implementation.

use super::error::ParseError;
use super::pratt::{
    infix_binding_power, prefix_binding_power, token_to_binary_op, token_to_unary_op,
};
use crate::ast::{
    Assignment, ColumnDef, CommonTableExpr, CreateProcedureStatement, CreateTableStatement,
    CursorKind, CursorLock, CursorScope, DataType, DeclareCursorStatement, DeclareItem,
    DeleteStatement, ExecParameter, ExecuteStatement, Expr, FetchDirection, FetchStatement,
    FunctionCall, IfStatement, InsertSource, InsertStatement, JoinClause, JoinType, Literal,
    OrderBy, OrderDirection, ProcedureParam, Program, RaiserrorStatement, SelectColumn,
    SelectStatement, Statement, TableRef, ThrowArgs, TryCatchStatement, UpdateStatement,
    WhileStatement, WithStatement,
};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// T-SQL parser: recursive descent for statements, Pratt for
/// expressions.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, crate::lexer::Span::default()),
        }
    }

    /// Parses a whole batch.
    ///
    /// Semicolons are optional statement separators; `GO` separates
    /// batches but is treated as a plain separator here.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` on the first statement that fails to
    /// parse.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.current.is_eof() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => {
                Ok(Statement::Select(self.parse_select_statement()?))
            }
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert_statement(),
            TokenKind::Keyword(Keyword::Update) => self.parse_update_statement(),
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete_statement(),
            TokenKind::Keyword(Keyword::With) => self.parse_with_statement(),
            TokenKind::Keyword(Keyword::Declare) => self.parse_declare_statement(),
            TokenKind::Keyword(Keyword::Set) => self.parse_set_statement(),
            TokenKind::Keyword(Keyword::Print) => {
                self.advance();
                Ok(Statement::Print(self.parse_expression(0)?))
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::Begin) => self.parse_begin(),
            TokenKind::Keyword(Keyword::Commit) => {
                self.advance();
                self.eat_keyword(Keyword::Transaction);
                Ok(Statement::CommitTransaction)
            }
            TokenKind::Keyword(Keyword::Rollback) => {
                self.advance();
                self.eat_keyword(Keyword::Transaction);
                Ok(Statement::RollbackTransaction)
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                Ok(Statement::Break)
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                Ok(Statement::Continue)
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let value = if prefix_binding_power(&self.current.kind).is_some() {
                    Some(self.parse_expression(0)?)
                } else {
                    None
                };
                Ok(Statement::Return(value))
            }
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw_statement(),
            TokenKind::Keyword(Keyword::Raiserror) => self.parse_raiserror_statement(),
            TokenKind::Keyword(Keyword::Exec) => self.parse_exec_statement(),
            TokenKind::Keyword(Keyword::Create) => self.parse_create_statement(),
            TokenKind::Keyword(Keyword::Drop) => {
                self.advance();
                self.expect_keyword(Keyword::Table)?;
                let name = self.expect_object_name()?;
                Ok(Statement::DropTable { name })
            }
            TokenKind::Keyword(Keyword::Truncate) => {
                self.advance();
                self.expect_keyword(Keyword::Table)?;
                let name = self.expect_object_name()?;
                Ok(Statement::TruncateTable { name })
            }
            TokenKind::Keyword(Keyword::Open) => {
                self.advance();
                let name = self.expect_identifier()?;
                Ok(Statement::OpenCursor { name })
            }
            TokenKind::Keyword(Keyword::Close) => {
                self.advance();
                let name = self.expect_identifier()?;
                Ok(Statement::CloseCursor { name })
            }
            TokenKind::Keyword(Keyword::Deallocate) => {
                self.advance();
                let name = self.expect_identifier()?;
                Ok(Statement::DeallocateCursor { name })
            }
            TokenKind::Keyword(Keyword::Fetch) => self.parse_fetch_statement(),
            other => Err(ParseError::unexpected(
                "a statement",
                other.clone(),
                self.current.span,
            )),
        }
    }

    /// Parses a `sp_executesql`-style parameter definition list:
    /// `@p1 int, @p2 varchar(50) OUTPUT`.
    pub fn parse_parameter_definitions(&mut self) -> Result<Vec<ProcedureParam>, ParseError> {
        let mut params = Vec::new();
        loop {
            let name = self.expect_variable()?;
            let data_type = self.parse_data_type()?;
            let default = if self.check(&TokenKind::Eq) {
                self.advance();
                Some(self.parse_expression(0)?)
            } else {
                None
            };
            let output = self.eat_keyword(Keyword::Output);
            params.push(ProcedureParam {
                name,
                data_type,
                default,
                output,
            });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(params)
    }

    // ===============================================================
    // Token plumbing
    // ===============================================================

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Peeks at the token after `current` without consuming anything.
    fn peek_next(&self) -> Token {
        self.lexer.clone().next_token()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.as_keyword() == Some(keyword)
    }

    /// Consumes the keyword if present; returns whether it was.
    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::unexpected(
                "identifier",
                other.clone(),
                self.current.span,
            )),
        }
    }

    fn expect_variable(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Variable(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::unexpected(
                "variable",
                other.clone(),
                self.current.span,
            )),
        }
    }

    /// An object name in a DML/DDL position: an identifier, a table
    /// variable (`@t`), or a schema-qualified identifier whose last
    /// segment is kept with its qualifier.
    fn expect_object_name(&mut self) -> Result<String, ParseError> {
        let mut name = match &self.current.kind {
            TokenKind::Identifier(n) => n.clone(),
            TokenKind::Variable(n) => n.clone(),
            other => {
                return Err(ParseError::unexpected(
                    "table name",
                    other.clone(),
                    self.current.span,
                ))
            }
        };
        self.advance();
        while self.check(&TokenKind::Dot) {
            self.advance();
            let part = self.expect_identifier()?;
            name.push('.');
            name.push_str(&part);
        }
        Ok(name)
    }

    fn skip_separators(&mut self) {
        while self.check(&TokenKind::Semicolon) || self.check_keyword(Keyword::Go) {
            self.advance();
        }
    }

    // ===============================================================
    // SELECT
    // ===============================================================

    fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = if self.eat_keyword(Keyword::Distinct) {
            true
        } else {
            self.eat_keyword(Keyword::All);
            false
        };

        let top = if self.eat_keyword(Keyword::Top) {
            if self.check(&TokenKind::LeftParen) {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Some(expr)
            } else {
                Some(self.parse_primary()?)
            }
        } else {
            None
        };

        let columns = self.parse_select_columns()?;

        let into = if self.eat_keyword(Keyword::Into) {
            Some(self.expect_object_name()?)
        } else {
            None
        };

        let from = if self.eat_keyword(Keyword::From) {
            Some(self.parse_table_ref()?)
        } else {
            None
        };

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        let group_by = if self.check_keyword(Keyword::Group) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let having = if self.eat_keyword(Keyword::Having) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        Ok(SelectStatement {
            distinct,
            top,
            columns,
            into,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            fetch: None,
        })
    }

    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];

        loop {
            // `@v = expr` is a T-SQL assignment column.
            let assign_to = match (&self.current.kind, &self.peek_next().kind) {
                (TokenKind::Variable(name), TokenKind::Eq) => {
                    let name = name.clone();
                    self.advance();
                    self.advance();
                    Some(name)
                }
                _ => None,
            };

            let expr = self.parse_expression(0)?;

            let alias = if assign_to.is_some() {
                None
            } else if self.eat_keyword(Keyword::As) {
                Some(self.expect_identifier()?)
            } else if matches!(&self.current.kind, TokenKind::Identifier(_)) {
                Some(self.expect_identifier()?)
            } else {
                None
            };

            columns.push(SelectColumn {
                expr,
                alias,
                assign_to,
            });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(columns)
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let mut table_ref = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let query = self.parse_select_statement()?;
            self.expect(&TokenKind::RightParen)?;
            self.eat_keyword(Keyword::As);
            let alias = self.expect_identifier()?;
            TableRef::Subquery {
                query: Box::new(query),
                alias,
            }
        } else {
            let first = self.expect_object_name()?;
            let (schema, name) = match first.split_once('.') {
                Some((schema, name)) => (Some(String::from(schema)), String::from(name)),
                None => (None, first),
            };
            let alias = self.parse_optional_alias();
            TableRef::Table {
                schema,
                name,
                alias,
            }
        };

        while let Some(join_type) = self.peek_join_type() {
            let join = self.parse_join_clause(join_type)?;
            table_ref = TableRef::Join {
                left: Box::new(table_ref),
                join: Box::new(join),
            };
        }

        Ok(table_ref)
    }

    fn parse_optional_alias(&mut self) -> Option<String> {
        if self.eat_keyword(Keyword::As) {
            return self.expect_identifier().ok();
        }
        if matches!(&self.current.kind, TokenKind::Identifier(_)) {
            return self.expect_identifier().ok();
        }
        None
    }

    /// Identifies a join at the current position without consuming it
    /// when there is none.
    fn peek_join_type(&self) -> Option<JoinType> {
        match self.current.as_keyword()? {
            Keyword::Join | Keyword::Inner => Some(JoinType::Inner),
            // LEFT/RIGHT only start a join when followed by
            // [OUTER] JOIN; otherwise they are the LEFT()/RIGHT()
            // string functions.
            Keyword::Left => match self.peek_next().as_keyword() {
                Some(Keyword::Join | Keyword::Outer) => Some(JoinType::Left),
                _ => None,
            },
            Keyword::Right => match self.peek_next().as_keyword() {
                Some(Keyword::Join | Keyword::Outer) => Some(JoinType::Right),
                _ => None,
            },
            Keyword::Full => Some(JoinType::Full),
            Keyword::Cross => Some(JoinType::Cross),
            _ => None,
        }
    }

    fn parse_join_clause(&mut self, join_type: JoinType) -> Result<JoinClause, ParseError> {
        match join_type {
            JoinType::Inner => {
                self.eat_keyword(Keyword::Inner);
            }
            JoinType::Left => {
                self.expect_keyword(Keyword::Left)?;
                self.eat_keyword(Keyword::Outer);
            }
            JoinType::Right => {
                self.expect_keyword(Keyword::Right)?;
                self.eat_keyword(Keyword::Outer);
            }
            JoinType::Full => {
                self.expect_keyword(Keyword::Full)?;
                self.eat_keyword(Keyword::Outer);
            }
            JoinType::Cross => {
                self.expect_keyword(Keyword::Cross)?;
            }
        }
        self.expect_keyword(Keyword::Join)?;

        let first = self.expect_object_name()?;
        let (schema, name) = match first.split_once('.') {
            Some((schema, name)) => (Some(String::from(schema)), String::from(name)),
            None => (None, first),
        };
        let alias = self.parse_optional_alias();
        let table = TableRef::Table {
            schema,
            name,
            alias,
        };

        let on = if matches!(join_type, JoinType::Cross) {
            None
        } else {
            self.expect_keyword(Keyword::On)?;
            Some(self.parse_expression(0)?)
        };

        Ok(JoinClause {
            join_type,
            table,
            on,
        })
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression(0)?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            exprs.push(self.parse_expression(0)?);
        }
        Ok(exprs)
    }

    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut entries = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let direction = if self.eat_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                self.eat_keyword(Keyword::Asc);
                OrderDirection::Asc
            };
            entries.push(OrderBy { expr, direction });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(entries)
    }

    // ===============================================================
    // INSERT / UPDATE / DELETE
    // ===============================================================

    fn parse_insert_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.eat_keyword(Keyword::Into);
        let full = self.expect_object_name()?;
        let (schema, table) = match full.split_once('.') {
            Some((schema, name)) => (Some(String::from(schema)), String::from(name)),
            None => (None, full),
        };

        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let mut cols = vec![self.expect_identifier()?];
            while self.check(&TokenKind::Comma) {
                self.advance();
                cols.push(self.expect_identifier()?);
            }
            self.expect(&TokenKind::RightParen)?;
            cols
        } else {
            vec![]
        };

        let source = if self.eat_keyword(Keyword::Values) {
            let mut rows = vec![self.parse_value_row()?];
            while self.check(&TokenKind::Comma) {
                self.advance();
                rows.push(self.parse_value_row()?);
            }
            InsertSource::Values(rows)
        } else if self.check_keyword(Keyword::Select) {
            InsertSource::Query(Box::new(self.parse_select_statement()?))
        } else if self.eat_keyword(Keyword::Default) {
            self.expect_keyword(Keyword::Values)?;
            InsertSource::DefaultValues
        } else {
            return Err(ParseError::unexpected(
                "VALUES, SELECT, or DEFAULT VALUES",
                self.current.kind.clone(),
                self.current.span,
            ));
        };

        Ok(Statement::Insert(InsertStatement {
            schema,
            table,
            columns,
            source,
        }))
    }

    fn parse_value_row(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut row = vec![self.parse_expression(0)?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            row.push(self.parse_expression(0)?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(row)
    }

    fn parse_update_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let full = self.expect_object_name()?;
        let (schema, table) = match full.split_once('.') {
            Some((schema, name)) => (Some(String::from(schema)), String::from(name)),
            None => (None, full),
        };

        self.expect_keyword(Keyword::Set)?;
        let mut assignments = vec![self.parse_assignment()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            assignments.push(self.parse_assignment()?);
        }

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        Ok(Statement::Update(UpdateStatement {
            schema,
            table,
            assignments,
            where_clause,
        }))
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let column = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression(0)?;
        Ok(Assignment { column, value })
    }

    fn parse_delete_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        self.eat_keyword(Keyword::From);
        let full = self.expect_object_name()?;
        let (schema, table) = match full.split_once('.') {
            Some((schema, name)) => (Some(String::from(schema)), String::from(name)),
            None => (None, full),
        };

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        Ok(Statement::Delete(DeleteStatement {
            schema,
            table,
            where_clause,
        }))
    }

    // ===============================================================
    // WITH (CTE)
    // ===============================================================

    fn parse_with_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::With)?;

        let mut ctes = vec![];
        loop {
            let name = self.expect_identifier()?;
            let columns = if self.check(&TokenKind::LeftParen) {
                self.advance();
                let mut cols = vec![self.expect_identifier()?];
                while self.check(&TokenKind::Comma) {
                    self.advance();
                    cols.push(self.expect_identifier()?);
                }
                self.expect(&TokenKind::RightParen)?;
                cols
            } else {
                vec![]
            };
            self.expect_keyword(Keyword::As)?;
            self.expect(&TokenKind::LeftParen)?;
            let query = self.parse_select_statement()?;
            self.expect(&TokenKind::RightParen)?;
            ctes.push(CommonTableExpr {
                name,
                columns,
                query,
            });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let body = match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => {
                Statement::Select(self.parse_select_statement()?)
            }
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert_statement()?,
            TokenKind::Keyword(Keyword::Update) => self.parse_update_statement()?,
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete_statement()?,
            other => {
                return Err(ParseError::unexpected(
                    "SELECT, INSERT, UPDATE, or DELETE after CTE list",
                    other.clone(),
                    self.current.span,
                ))
            }
        };

        Ok(Statement::With(WithStatement {
            ctes,
            body: Box::new(body),
        }))
    }

    // ===============================================================
    // DECLARE (variables, table variables, cursors)
    // ===============================================================

    fn parse_declare_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Declare)?;

        // DECLARE name CURSOR ... FOR select
        if matches!(&self.current.kind, TokenKind::Identifier(_)) {
            return self.parse_declare_cursor();
        }

        let mut items = vec![];
        loop {
            let name = self.expect_variable()?;
            if self.eat_keyword(Keyword::Table) {
                self.expect(&TokenKind::LeftParen)?;
                let columns = self.parse_column_defs()?;
                self.expect(&TokenKind::RightParen)?;
                items.push(DeclareItem::Table { name, columns });
            } else {
                self.eat_keyword(Keyword::As);
                let data_type = self.parse_data_type()?;
                let init = if self.check(&TokenKind::Eq) {
                    self.advance();
                    Some(self.parse_expression(0)?)
                } else {
                    None
                };
                items.push(DeclareItem::Scalar {
                    name,
                    data_type,
                    init,
                });
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(Statement::Declare(items))
    }

    fn parse_declare_cursor(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_identifier()?;

        let mut scope = CursorScope::default();
        let mut kind = CursorKind::default();
        let mut scroll = false;
        let mut lock = CursorLock::default();

        // SCROLL may precede the CURSOR keyword.
        if self.eat_keyword(Keyword::Scroll) {
            scroll = true;
        }
        self.expect_keyword(Keyword::Cursor)?;

        loop {
            match self.current.as_keyword() {
                Some(Keyword::Global) => {
                    scope = CursorScope::Global;
                    self.advance();
                }
                Some(Keyword::Local) => {
                    scope = CursorScope::Local;
                    self.advance();
                }
                Some(Keyword::ForwardOnly) => {
                    kind = CursorKind::ForwardOnly;
                    self.advance();
                }
                Some(Keyword::Scroll) => {
                    scroll = true;
                    self.advance();
                }
                Some(Keyword::Static) => {
                    kind = CursorKind::Static;
                    self.advance();
                }
                Some(Keyword::Keyset) => {
                    kind = CursorKind::Keyset;
                    self.advance();
                }
                Some(Keyword::Dynamic) => {
                    kind = CursorKind::Dynamic;
                    self.advance();
                }
                Some(Keyword::FastForward) => {
                    kind = CursorKind::FastForward;
                    self.advance();
                }
                Some(Keyword::ReadOnly) => {
                    lock = CursorLock::ReadOnly;
                    self.advance();
                }
                Some(Keyword::ScrollLocks) => {
                    lock = CursorLock::ScrollLocks;
                    self.advance();
                }
                Some(Keyword::Optimistic) => {
                    lock = CursorLock::Optimistic;
                    self.advance();
                }
                _ => break,
            }
        }

        self.expect_keyword(Keyword::For)?;

        // The cursor query is captured verbatim so that variable
        // substitution can be deferred to OPEN time.
        let query_start = self.current.span.start;
        self.parse_select_statement()?;
        let query_end = self.previous.span.end;
        let query = String::from(self.input[query_start..query_end].trim());

        Ok(Statement::DeclareCursor(DeclareCursorStatement {
            name,
            query,
            scope,
            kind,
            scroll,
            lock,
        }))
    }

    fn parse_column_defs(&mut self) -> Result<Vec<ColumnDef>, ParseError> {
        let mut columns = vec![self.parse_column_def()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            columns.push(self.parse_column_def()?);
        }
        Ok(columns)
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut column = ColumnDef::new(name, data_type);

        loop {
            match self.current.as_keyword() {
                Some(Keyword::Identity) => {
                    self.advance();
                    let mut seed = 1;
                    let mut increment = 1;
                    if self.check(&TokenKind::LeftParen) {
                        self.advance();
                        seed = self.expect_integer()?;
                        self.expect(&TokenKind::Comma)?;
                        increment = self.expect_integer()?;
                        self.expect(&TokenKind::RightParen)?;
                    }
                    column = column.identity(seed, increment);
                }
                Some(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    column = column.primary_key();
                }
                Some(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    column = column.not_null();
                }
                Some(Keyword::Null) => {
                    self.advance();
                    column.nullable = true;
                }
                Some(Keyword::Default) => {
                    self.advance();
                    let expr = self.parse_expression(0)?;
                    column = column.default(expr);
                }
                _ => break,
            }
        }

        Ok(column)
    }

    fn expect_integer(&mut self) -> Result<i64, ParseError> {
        let negative = self.check(&TokenKind::Minus);
        if negative {
            self.advance();
        }
        match &self.current.kind {
            TokenKind::Integer(i) => {
                let value = if negative { -i } else { *i };
                self.advance();
                Ok(value)
            }
            other => Err(ParseError::unexpected(
                "integer",
                other.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let keyword = self.current.as_keyword();
        let data_type = match keyword {
            Some(Keyword::Tinyint) => {
                self.advance();
                DataType::TinyInt
            }
            Some(Keyword::Smallint) => {
                self.advance();
                DataType::SmallInt
            }
            Some(Keyword::Int | Keyword::Integer) => {
                self.advance();
                DataType::Int
            }
            Some(Keyword::Bigint) => {
                self.advance();
                DataType::BigInt
            }
            Some(Keyword::Bit) => {
                self.advance();
                DataType::Bit
            }
            Some(Keyword::Decimal | Keyword::Numeric) => {
                self.advance();
                let (precision, scale) = self.parse_precision_scale()?;
                DataType::Decimal { precision, scale }
            }
            Some(Keyword::Money) => {
                self.advance();
                DataType::Decimal {
                    precision: Some(19),
                    scale: Some(4),
                }
            }
            Some(Keyword::Float | Keyword::Real) => {
                self.advance();
                // FLOAT(n) mantissa width is accepted and ignored.
                self.parse_optional_length()?;
                DataType::Float
            }
            Some(Keyword::Char) => {
                self.advance();
                DataType::Char(self.parse_optional_length()?)
            }
            Some(Keyword::Varchar) => {
                self.advance();
                DataType::VarChar(self.parse_optional_length()?)
            }
            Some(Keyword::Nchar) => {
                self.advance();
                DataType::NChar(self.parse_optional_length()?)
            }
            Some(Keyword::Nvarchar) => {
                self.advance();
                DataType::NVarChar(self.parse_optional_length()?)
            }
            Some(Keyword::Text | Keyword::Ntext) => {
                self.advance();
                DataType::Text
            }
            Some(Keyword::Date) => {
                self.advance();
                DataType::Date
            }
            Some(Keyword::Time) => {
                self.advance();
                self.parse_optional_length()?;
                DataType::Time
            }
            Some(Keyword::Datetime | Keyword::Smalldatetime) => {
                self.advance();
                DataType::DateTime
            }
            Some(Keyword::Datetime2) => {
                self.advance();
                self.parse_optional_length()?;
                DataType::DateTime
            }
            Some(Keyword::Binary | Keyword::Varbinary) => {
                self.advance();
                DataType::Binary(self.parse_optional_length()?)
            }
            Some(Keyword::Image) => {
                self.advance();
                DataType::Binary(None)
            }
            Some(Keyword::Uniqueidentifier) => {
                self.advance();
                DataType::UniqueIdentifier
            }
            _ => match &self.current.kind {
                TokenKind::Identifier(name) => {
                    let name = name.clone();
                    self.advance();
                    DataType::Custom(name)
                }
                other => {
                    return Err(ParseError::unexpected(
                        "data type",
                        other.clone(),
                        self.current.span,
                    ))
                }
            },
        };
        Ok(data_type)
    }

    /// Parses an optional `(n)` or `(MAX)` length suffix.
    fn parse_optional_length(&mut self) -> Result<Option<u32>, ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            return Ok(None);
        }
        self.advance();
        let length = match &self.current.kind {
            TokenKind::Integer(i) => {
                let value = u32::try_from(*i).map_err(|_| {
                    ParseError::new("Type length out of range", self.current.span)
                })?;
                self.advance();
                Some(value)
            }
            TokenKind::Keyword(Keyword::Max) => {
                self.advance();
                None
            }
            other => {
                return Err(ParseError::unexpected(
                    "length or MAX",
                    other.clone(),
                    self.current.span,
                ))
            }
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(length)
    }

    fn parse_precision_scale(&mut self) -> Result<(Option<u16>, Option<u16>), ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            return Ok((None, None));
        }
        self.advance();
        let precision = u16::try_from(self.expect_integer()?)
            .map_err(|_| ParseError::new("Precision out of range", self.previous.span))?;
        let scale = if self.check(&TokenKind::Comma) {
            self.advance();
            Some(
                u16::try_from(self.expect_integer()?)
                    .map_err(|_| ParseError::new("Scale out of range", self.previous.span))?,
            )
        } else {
            None
        };
        self.expect(&TokenKind::RightParen)?;
        Ok((Some(precision), scale))
    }

    // ===============================================================
    // SET / control flow
    // ===============================================================

    fn parse_set_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Set)?;
        match &self.current.kind {
            TokenKind::Variable(name) => {
                let name = name.clone();
                self.advance();
                self.expect(&TokenKind::Eq)?;
                let value = self.parse_expression(0)?;
                Ok(Statement::SetVariable { name, value })
            }
            // Session options: SET NOCOUNT ON, SET XACT_ABORT OFF, ...
            TokenKind::Identifier(option) => {
                let option = option.to_ascii_uppercase();
                self.advance();
                let enabled = match &self.current.kind {
                    TokenKind::Keyword(Keyword::On) => {
                        self.advance();
                        true
                    }
                    TokenKind::Identifier(word) if word.eq_ignore_ascii_case("off") => {
                        self.advance();
                        false
                    }
                    other => {
                        return Err(ParseError::unexpected(
                            "ON or OFF",
                            other.clone(),
                            self.current.span,
                        ))
                    }
                };
                Ok(Statement::SetOption { option, enabled })
            }
            other => Err(ParseError::unexpected(
                "variable or session option",
                other.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression(0)?;
        let then_branch = Box::new(self.parse_statement()?);
        self.skip_separators();
        let else_branch = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_expression(0)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement { condition, body }))
    }

    /// BEGIN opens a transaction, a TRY/CATCH construct, or a block.
    fn parse_begin(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Begin)?;

        if self.eat_keyword(Keyword::Transaction) {
            return Ok(Statement::BeginTransaction);
        }

        if self.eat_keyword(Keyword::Try) {
            let try_block = self.parse_statement_list_until(Keyword::End)?;
            self.expect_keyword(Keyword::End)?;
            self.expect_keyword(Keyword::Try)?;
            self.skip_separators();
            self.expect_keyword(Keyword::Begin)?;
            self.expect_keyword(Keyword::Catch)?;
            let catch_block = self.parse_statement_list_until(Keyword::End)?;
            self.expect_keyword(Keyword::End)?;
            self.expect_keyword(Keyword::Catch)?;
            return Ok(Statement::TryCatch(TryCatchStatement {
                try_block,
                catch_block,
            }));
        }

        let statements = self.parse_statement_list_until(Keyword::End)?;
        self.expect_keyword(Keyword::End)?;
        Ok(Statement::Block(statements))
    }

    fn parse_statement_list_until(
        &mut self,
        terminator: Keyword,
    ) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];
        loop {
            self.skip_separators();
            if self.check_keyword(terminator) || self.current.is_eof() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // ===============================================================
    // THROW / RAISERROR
    // ===============================================================

    fn parse_throw_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Throw)?;
        if prefix_binding_power(&self.current.kind).is_none() {
            return Ok(Statement::Throw(None));
        }
        let number = self.parse_expression(0)?;
        self.expect(&TokenKind::Comma)?;
        let message = self.parse_expression(0)?;
        self.expect(&TokenKind::Comma)?;
        let state = self.parse_expression(0)?;
        Ok(Statement::Throw(Some(ThrowArgs {
            number,
            message,
            state,
        })))
    }

    fn parse_raiserror_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Raiserror)?;
        self.expect(&TokenKind::LeftParen)?;
        let message = self.parse_expression(0)?;
        self.expect(&TokenKind::Comma)?;
        let severity = self.parse_expression(0)?;
        self.expect(&TokenKind::Comma)?;
        let state = self.parse_expression(0)?;
        let mut args = vec![];
        while self.check(&TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expression(0)?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Statement::Raiserror(RaiserrorStatement {
            message,
            severity,
            state,
            args,
        }))
    }

    // ===============================================================
    // EXEC
    // ===============================================================

    fn parse_exec_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Exec)?;

        // EXEC(@sql) — dynamic SQL.
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let expr = self.parse_expression(0)?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Statement::Execute(ExecuteStatement::DynamicSql(expr)));
        }

        let name = self.expect_object_name()?;
        let mut params = vec![];

        if self.exec_param_starts_here() {
            loop {
                params.push(self.parse_exec_parameter()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        Ok(Statement::Execute(ExecuteStatement::Procedure {
            name,
            params,
        }))
    }

    /// Whether the current token starts an EXEC argument. Statements
    /// all begin with keywords, so an expression-starting token after
    /// the procedure name belongs to the argument list.
    fn exec_param_starts_here(&self) -> bool {
        match &self.current.kind {
            TokenKind::Variable(_) => true,
            kind => prefix_binding_power(kind).is_some() && !matches!(kind, TokenKind::Star),
        }
    }

    fn parse_exec_parameter(&mut self) -> Result<ExecParameter, ParseError> {
        let name = match (&self.current.kind, &self.peek_next().kind) {
            (TokenKind::Variable(name), TokenKind::Eq) => {
                let name = name.clone();
                self.advance();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        let value = self.parse_expression(0)?;
        let output = self.eat_keyword(Keyword::Output);
        Ok(ExecParameter {
            name,
            value,
            output,
        })
    }

    // ===============================================================
    // CREATE
    // ===============================================================

    fn parse_create_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Create)?;
        match self.current.as_keyword() {
            Some(Keyword::Table) => {
                self.advance();
                let name = self.expect_object_name()?;
                self.expect(&TokenKind::LeftParen)?;
                let columns = self.parse_column_defs()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Statement::CreateTable(CreateTableStatement {
                    name,
                    columns,
                }))
            }
            Some(Keyword::Procedure) => {
                self.advance();
                self.parse_create_procedure()
            }
            _ => Err(ParseError::unexpected(
                "TABLE or PROCEDURE",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_create_procedure(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_object_name()?;

        let mut params = vec![];
        let parenthesized = self.check(&TokenKind::LeftParen);
        if parenthesized {
            self.advance();
        }
        if matches!(&self.current.kind, TokenKind::Variable(_)) {
            params = self.parse_parameter_definitions()?;
        }
        if parenthesized {
            self.expect(&TokenKind::RightParen)?;
        }

        self.expect_keyword(Keyword::As)?;

        // Either BEGIN ... END, or a statement list running to the
        // end of the batch.
        let body = if self.check_keyword(Keyword::Begin)
            && !matches!(
                self.peek_next().as_keyword(),
                Some(Keyword::Transaction | Keyword::Try)
            ) {
            self.advance();
            let body = self.parse_statement_list_until(Keyword::End)?;
            self.expect_keyword(Keyword::End)?;
            body
        } else {
            let mut body = vec![];
            loop {
                self.skip_separators();
                if self.current.is_eof() || self.check_keyword(Keyword::Go) {
                    break;
                }
                body.push(self.parse_statement()?);
            }
            body
        };

        Ok(Statement::CreateProcedure(CreateProcedureStatement {
            name,
            params,
            body,
        }))
    }

    // ===============================================================
    // FETCH
    // ===============================================================

    fn parse_fetch_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Fetch)?;

        let direction = match self.current.as_keyword() {
            Some(Keyword::Next) => {
                self.advance();
                FetchDirection::Next
            }
            Some(Keyword::Prior) => {
                self.advance();
                FetchDirection::Prior
            }
            Some(Keyword::First) => {
                self.advance();
                FetchDirection::First
            }
            Some(Keyword::Last) => {
                self.advance();
                FetchDirection::Last
            }
            Some(Keyword::Absolute) => {
                self.advance();
                FetchDirection::Absolute(self.expect_integer()?)
            }
            Some(Keyword::Relative) => {
                self.advance();
                FetchDirection::Relative(self.expect_integer()?)
            }
            _ => FetchDirection::Next,
        };

        self.eat_keyword(Keyword::From);
        let cursor = self.expect_identifier()?;

        let mut into = vec![];
        if self.eat_keyword(Keyword::Into) {
            into.push(self.expect_variable()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                into.push(self.expect_variable()?);
            }
        }

        Ok(Statement::Fetch(FetchStatement {
            direction,
            cursor,
            into,
        }))
    }

    // ===============================================================
    // Expressions
    // ===============================================================

    /// Parses an expression with the given minimum binding power
    /// (Pratt parsing).
    pub fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((left_bp, right_bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }

            // IS [NOT] NULL
            if self.check_keyword(Keyword::Is) {
                self.advance();
                let negated = self.eat_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Null)?;
                lhs = Expr::IsNull {
                    expr: Box::new(lhs),
                    negated,
                };
                continue;
            }

            // NOT IN / NOT BETWEEN / NOT LIKE
            if self.check_keyword(Keyword::Not) {
                match self.peek_next().as_keyword() {
                    Some(Keyword::In) => {
                        self.advance();
                        self.advance();
                        lhs = self.parse_in_rest(lhs, true)?;
                        continue;
                    }
                    Some(Keyword::Between) => {
                        self.advance();
                        self.advance();
                        lhs = self.parse_between_rest(lhs, true)?;
                        continue;
                    }
                    Some(Keyword::Like) => {
                        self.advance();
                        self.advance();
                        let pattern = self.parse_expression(right_bp)?;
                        lhs = Expr::Unary {
                            op: crate::ast::UnaryOp::Not,
                            operand: Box::new(lhs.binary(crate::ast::BinaryOp::Like, pattern)),
                        };
                        continue;
                    }
                    _ => break,
                }
            }

            if self.check_keyword(Keyword::In) {
                self.advance();
                lhs = self.parse_in_rest(lhs, false)?;
                continue;
            }

            if self.check_keyword(Keyword::Between) {
                self.advance();
                lhs = self.parse_between_rest(lhs, false)?;
                continue;
            }

            let Some(op) = token_to_binary_op(&self.current.kind) else {
                break;
            };
            self.advance();
            let rhs = self.parse_expression(right_bp)?;
            lhs = lhs.binary(op, rhs);
        }

        Ok(lhs)
    }

    fn parse_in_rest(&mut self, lhs: Expr, negated: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let list = if self.check_keyword(Keyword::Select) {
            let query = self.parse_select_statement()?;
            vec![Expr::Subquery(Box::new(query))]
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::In {
            expr: Box::new(lhs),
            list,
            negated,
        })
    }

    fn parse_between_rest(&mut self, lhs: Expr, negated: bool) -> Result<Expr, ParseError> {
        // Bounds bind tighter than AND, so parse above AND's power.
        let low = self.parse_expression(6)?;
        self.expect_keyword(Keyword::And)?;
        let high = self.parse_expression(6)?;
        Ok(Expr::Between {
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = token_to_unary_op(&self.current.kind) {
            let bp = prefix_binding_power(&self.current.kind).unwrap_or(11);
            self.advance();
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current.kind {
            TokenKind::Integer(i) => {
                let value = *i;
                self.advance();
                Ok(Expr::Literal(Literal::Integer(value)))
            }
            TokenKind::Float(f) => {
                let value = *f;
                self.advance();
                Ok(Expr::Literal(Literal::Float(value)))
            }
            TokenKind::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr::Literal(Literal::String(value)))
            }
            TokenKind::Binary(b) => {
                let value = b.clone();
                self.advance();
                Ok(Expr::Literal(Literal::Binary(value)))
            }
            TokenKind::Variable(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::Variable(name))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { table: None })
            }
            TokenKind::LeftParen => {
                self.advance();
                if self.check_keyword(Keyword::Select) {
                    let query = self.parse_select_statement()?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Subquery(Box::new(query)))
                } else {
                    let inner = self.parse_expression(0)?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Paren(Box::new(inner)))
                }
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),
            TokenKind::Keyword(Keyword::Convert) => self.parse_convert_expression(),
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = self.parse_select_statement()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Exists(Box::new(query)))
            }
            TokenKind::Keyword(
                kw @ (Keyword::Count
                | Keyword::Sum
                | Keyword::Avg
                | Keyword::Min
                | Keyword::Max
                | Keyword::Left
                | Keyword::Right),
            ) => {
                let name = String::from(kw.as_str());
                self.advance();
                self.parse_function_call(name)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name.to_ascii_uppercase());
                }
                // t.* or t.col
                if self.check(&TokenKind::Dot) {
                    self.advance();
                    if self.check(&TokenKind::Star) {
                        self.advance();
                        return Ok(Expr::Wildcard { table: Some(name) });
                    }
                    let column = self.expect_identifier()?;
                    return Ok(Expr::Column {
                        table: Some(name),
                        name: column,
                    });
                }
                Ok(Expr::Column { table: None, name })
            }
            other => Err(ParseError::unexpected(
                "expression",
                other.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.eat_keyword(Keyword::Distinct);
        let mut args = vec![];
        if !self.check(&TokenKind::RightParen) {
            args.push(self.parse_function_arg()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_function_arg()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
        }))
    }

    /// A function argument; `*` (as in `COUNT(*)`) and data-type
    /// keywords (as in `CONVERT`-style helpers) are valid here.
    fn parse_function_arg(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(Expr::Wildcard { table: None });
        }
        self.parse_expression(0)
    }

    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;

        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_clauses = vec![];
        while self.eat_keyword(Keyword::When) {
            let when = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then = self.parse_expression(0)?;
            when_clauses.push((when, then));
        }

        let else_clause = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        self.expect_keyword(Keyword::End)?;
        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// `CONVERT(type, expr [, style])` parses into the same Cast node;
    /// the style argument is accepted and ignored.
    fn parse_convert_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Convert)?;
        self.expect(&TokenKind::LeftParen)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::Comma)?;
        let expr = self.parse_expression(0)?;
        if self.check(&TokenKind::Comma) {
            self.advance();
            self.parse_expression(0)?;
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }
}
