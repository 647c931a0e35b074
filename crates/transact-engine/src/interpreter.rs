//! The tree-walking T-SQL interpreter.
//!
//! `Interpreter` dispatches every statement variant, threading all
//! session state through a shared [`ExecutionContext`]. Nested
//! procedure calls build a child interpreter over the *same* context
//! with `nesting_level + 1`; dynamic SQL re-enters at the current
//! level. Statement order is strict: statement *i* fully completes
//! before *i + 1* begins, and result sets append in execution order
//! across nested calls.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};
use transact_core::ast::{
    CreateProcedureStatement, DeclareCursorStatement, DeclareItem, DeleteStatement,
    ExecParameter, ExecuteStatement, Expr, FetchStatement, FunctionCall, IfStatement,
    InsertSource, InsertStatement, RaiserrorStatement, SelectStatement, Statement, TableRef,
    ThrowArgs, TryCatchStatement, UpdateStatement, WhileStatement, WithStatement,
};
use transact_core::{Dialect, Parser, SqlType, Value};

use crate::backend::{Backend, ExecOutput};
use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::ddl::{self, DdlHandler, DdlOutcome};
use crate::error::{EngineError, Result, SqlError};
use crate::eval::{row_scope, Evaluator, RowScope};
use crate::normalizer::SqlNormalizer;
use crate::resolver::ProcedureResolver;
use crate::result::{ExecutionResult, ResultSet};
use crate::rewriter::AstRewriter;
use crate::temp_table::{is_temp_name, TempTable};

/// Maximum depth of nested procedure calls.
pub const MAX_NESTING_LEVEL: u32 = 32;

/// Safety cap on WHILE loop iterations.
pub const WHILE_ITERATION_CAP: u32 = 10_000;

/// Non-error control flow escaping a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

/// The statement executor.
pub struct Interpreter {
    backend: Arc<dyn Backend>,
    dialect: Dialect,
    evaluator: Evaluator,
    normalizer: SqlNormalizer,
    rewriter: AstRewriter,
    ddl: DdlHandler,
    resolver: Option<Arc<dyn ProcedureResolver>>,
    database: String,
    nesting_level: u32,
}

impl Interpreter {
    /// Creates an interpreter over a backend speaking `dialect`.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, dialect: Dialect) -> Self {
        Self {
            backend,
            dialect,
            evaluator: Evaluator::new(),
            normalizer: SqlNormalizer::new(dialect),
            rewriter: AstRewriter::new(dialect),
            ddl: DdlHandler::new(dialect),
            resolver: None,
            database: String::new(),
            nesting_level: 0,
        }
    }

    /// Installs a procedure resolver; EXEC of named procedures is
    /// rejected without one.
    pub fn set_resolver(&mut self, resolver: Arc<dyn ProcedureResolver>) {
        self.resolver = Some(resolver);
    }

    /// Sets the current database name handed to the resolver.
    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
    }

    /// Overrides the nesting level (used by hosts resuming a call
    /// chain).
    pub fn set_nesting_level(&mut self, level: u32) {
        self.nesting_level = level;
    }

    /// The dialect this interpreter emits.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Binds a variable in the session environment and the
    /// interpreter's locals.
    pub fn set_variable(&mut self, ctx: &mut ExecutionContext, name: &str, value: Value) {
        ctx.variables.set(name, value.clone());
        self.evaluator.locals.set(name, value);
    }

    /// Reads a variable: session first, then locals.
    #[must_use]
    pub fn get_variable(&self, ctx: &ExecutionContext, name: &str) -> Option<Value> {
        ctx.variables
            .get(name)
            .or_else(|| self.evaluator.locals.get(name))
            .cloned()
    }

    /// Runs a batch. The returned [`ExecutionResult`] carries every
    /// result set produced before any failure; an uncaught error is
    /// recorded in its `error` field (and in `@@ERROR`) rather than
    /// discarding the partial results.
    pub async fn execute(
        &mut self,
        ctx: &mut ExecutionContext,
        sql: &str,
        params: &[(String, Value)],
    ) -> ExecutionResult {
        let (mut result, error) = self.run(ctx, sql, params).await;
        if let Some(error) = error {
            let sql_error = error.to_sql_error();
            ctx.record_error(sql_error.clone());
            result.error = Some(sql_error);
        }
        result
    }

    /// Runs a batch and returns its first result set (empty if the
    /// batch produced none).
    pub async fn execute_query(
        &mut self,
        ctx: &mut ExecutionContext,
        sql: &str,
        params: &[(String, Value)],
    ) -> Result<ResultSet> {
        let (result, error) = self.run(ctx, sql, params).await;
        if let Some(error) = error {
            ctx.record_error(error.to_sql_error());
            return Err(error);
        }
        Ok(result.result_sets.into_iter().next().unwrap_or_default())
    }

    /// Runs a batch and returns the first cell of the first row, if
    /// any.
    pub async fn execute_scalar(
        &mut self,
        ctx: &mut ExecutionContext,
        sql: &str,
        params: &[(String, Value)],
    ) -> Result<Option<Value>> {
        let result_set = self.execute_query(ctx, sql, params).await?;
        Ok(result_set.scalar().cloned())
    }

    /// Runs a batch and returns the cumulative rows affected.
    pub async fn execute_non_query(
        &mut self,
        ctx: &mut ExecutionContext,
        sql: &str,
        params: &[(String, Value)],
    ) -> Result<u64> {
        let (result, error) = self.run(ctx, sql, params).await;
        if let Some(error) = error {
            ctx.record_error(error.to_sql_error());
            return Err(error);
        }
        Ok(result.rows_affected)
    }

    async fn run(
        &mut self,
        ctx: &mut ExecutionContext,
        sql: &str,
        params: &[(String, Value)],
    ) -> (ExecutionResult, Option<EngineError>) {
        let mut result = ExecutionResult::default();

        let program = match Parser::new(sql).parse_program() {
            Ok(program) => program,
            Err(e) => return (result, Some(e.into())),
        };

        for (name, value) in params {
            self.set_variable(ctx, name, value.clone());
        }
        ctx.has_returned = false;
        ctx.return_value = None;
        ctx.set_nest_level(self.nesting_level);

        let error = match self
            .execute_statements(ctx, &mut result, &program.statements)
            .await
        {
            Ok(_) => None,
            Err(e) => Some(e),
        };

        if ctx.return_value.is_some() {
            result.return_value = ctx.return_value;
        }
        ctx.has_returned = false;
        (result, error)
    }

    /// Runs a statement list, stopping at RETURN, BREAK/CONTINUE, an
    /// error, or cancellation.
    fn execute_statements<'a>(
        &'a mut self,
        ctx: &'a mut ExecutionContext,
        result: &'a mut ExecutionResult,
        statements: &'a [Statement],
    ) -> BoxFuture<'a, Result<Flow>> {
        Box::pin(async move {
            for statement in statements {
                if ctx.cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                if ctx.has_returned {
                    break;
                }
                let flow = self.execute_statement(ctx, result, statement).await?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
            }
            Ok(Flow::Normal)
        })
    }

    fn execute_statement<'a>(
        &'a mut self,
        ctx: &'a mut ExecutionContext,
        result: &'a mut ExecutionResult,
        statement: &'a Statement,
    ) -> BoxFuture<'a, Result<Flow>> {
        Box::pin(async move {
            match statement {
                Statement::Select(select) => {
                    self.execute_select(ctx, result, select).await?;
                    Ok(Flow::Normal)
                }
                Statement::Insert(insert) => {
                    self.execute_insert(ctx, result, insert).await?;
                    Ok(Flow::Normal)
                }
                Statement::Update(update) => {
                    self.execute_update(ctx, result, update).await?;
                    Ok(Flow::Normal)
                }
                Statement::Delete(delete) => {
                    self.execute_delete(ctx, result, delete).await?;
                    Ok(Flow::Normal)
                }
                Statement::With(with) => {
                    self.execute_with(ctx, result, with).await?;
                    Ok(Flow::Normal)
                }
                Statement::Declare(items) => {
                    self.execute_declare(ctx, items)?;
                    Ok(Flow::Normal)
                }
                Statement::SetVariable { name, value } => {
                    let value = self.evaluator.eval(ctx, value)?;
                    self.set_variable(ctx, name, value);
                    Ok(Flow::Normal)
                }
                Statement::SetOption { option, enabled } => {
                    // Session options are accepted and ignored.
                    debug!(option = %option, enabled, "Ignoring session option");
                    Ok(Flow::Normal)
                }
                Statement::Print(expr) => {
                    let value = self.evaluator.eval(ctx, expr)?;
                    println!("{}", value.as_string());
                    Ok(Flow::Normal)
                }
                Statement::If(stmt) => self.execute_if(ctx, result, stmt).await,
                Statement::While(stmt) => self.execute_while(ctx, result, stmt).await,
                Statement::Block(statements) => {
                    self.execute_statements(ctx, result, statements).await
                }
                Statement::Break => Ok(Flow::Break),
                Statement::Continue => Ok(Flow::Continue),
                Statement::Return(value) => {
                    if let Some(expr) = value {
                        let value = self.evaluator.eval(ctx, expr)?;
                        ctx.return_value =
                            value.as_int().map(|i| i32::try_from(i).unwrap_or(i32::MAX));
                    }
                    ctx.has_returned = true;
                    Ok(Flow::Normal)
                }
                Statement::TryCatch(stmt) => self.execute_try_catch(ctx, result, stmt).await,
                Statement::Throw(args) => Err(self.execute_throw(ctx, args.as_ref())?),
                Statement::Raiserror(stmt) => {
                    self.execute_raiserror(ctx, stmt)?;
                    Ok(Flow::Normal)
                }
                Statement::Execute(exec) => {
                    self.execute_exec(ctx, result, exec).await?;
                    Ok(Flow::Normal)
                }
                Statement::CreateTable(stmt) => {
                    let outcome = self.ddl.create_table(ctx, &self.evaluator, stmt)?;
                    self.finish_ddl(ctx, outcome).await?;
                    Ok(Flow::Normal)
                }
                Statement::DropTable { name } => {
                    let outcome = self.ddl.drop_table(ctx, name)?;
                    self.finish_ddl(ctx, outcome).await?;
                    Ok(Flow::Normal)
                }
                Statement::TruncateTable { name } => {
                    let outcome = self.ddl.truncate_table(ctx, name)?;
                    self.finish_ddl(ctx, outcome).await?;
                    Ok(Flow::Normal)
                }
                Statement::CreateProcedure(proc) => {
                    self.execute_procedure_body(ctx, result, proc).await?;
                    Ok(Flow::Normal)
                }
                Statement::BeginTransaction => {
                    self.backend.begin().await?;
                    ctx.transaction_depth += 1;
                    ctx.set_trancount(ctx.transaction_depth);
                    Ok(Flow::Normal)
                }
                Statement::CommitTransaction => {
                    self.backend.commit().await?;
                    ctx.transaction_depth = ctx.transaction_depth.saturating_sub(1);
                    ctx.set_trancount(ctx.transaction_depth);
                    Ok(Flow::Normal)
                }
                Statement::RollbackTransaction => {
                    self.backend.rollback().await?;
                    ctx.transaction_depth = 0;
                    ctx.set_trancount(0);
                    Ok(Flow::Normal)
                }
                Statement::DeclareCursor(stmt) => {
                    self.execute_declare_cursor(ctx, stmt);
                    Ok(Flow::Normal)
                }
                Statement::OpenCursor { name } => {
                    self.execute_open_cursor(ctx, name).await?;
                    Ok(Flow::Normal)
                }
                Statement::Fetch(stmt) => {
                    self.execute_fetch(ctx, result, stmt)?;
                    Ok(Flow::Normal)
                }
                Statement::CloseCursor { name } => {
                    let cursor = ctx
                        .cursors
                        .get_mut(name)
                        .ok_or_else(|| EngineError::UndefinedObject(name.clone()))?;
                    if !cursor.open {
                        return Err(EngineError::CursorNotOpen(name.clone()));
                    }
                    cursor.close();
                    Ok(Flow::Normal)
                }
                Statement::DeallocateCursor { name } => {
                    if !ctx.cursors.deallocate(name) {
                        return Err(EngineError::UndefinedObject(name.clone()));
                    }
                    Ok(Flow::Normal)
                }
            }
        })
    }

    // ===============================================================
    // SELECT: the four dispatch paths
    // ===============================================================

    /// SELECT dispatch, in priority order: INTO, variable assignment,
    /// local (FROM-less), temp-table scan, backend.
    async fn execute_select(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        select: &SelectStatement,
    ) -> Result<()> {
        if select.into.is_some() {
            return self.execute_select_into(ctx, result, select).await;
        }
        if select.is_assignment() {
            return self.execute_select_assign(ctx, select).await;
        }

        let result_set = self.materialize_select(ctx, select).await?;
        ctx.set_row_count(result_set.rows.len() as u64);
        result.result_sets.push(result_set);
        Ok(())
    }

    /// Produces the rows of a SELECT without recording counters:
    /// FROM-less selects evaluate locally, temp-table sources scan the
    /// store, everything else goes to the backend.
    async fn materialize_select(
        &self,
        ctx: &ExecutionContext,
        select: &SelectStatement,
    ) -> Result<ResultSet> {
        if let Some(name) = select.from.as_ref().and_then(TableRef::base_name) {
            if is_temp_name(name) {
                return self.scan_temp_select(ctx, select, name);
            }
        }
        if select.from.is_none() {
            return self.evaluate_local_select(ctx, select);
        }

        let mut stripped = select.clone();
        stripped.into = None;
        let rendered = self.rewriter.render_select(&stripped);
        let output = self.send_query(ctx, &rendered).await?;
        Ok(ResultSet {
            columns: output.columns,
            rows: output.rows,
        })
    }

    /// A FROM-less SELECT: one row of locally evaluated expressions.
    /// `ERROR_MESSAGE()` and the `@@` counters resolve here without a
    /// backend round trip.
    fn evaluate_local_select(
        &self,
        ctx: &ExecutionContext,
        select: &SelectStatement,
    ) -> Result<ResultSet> {
        if let Some(where_clause) = &select.where_clause {
            if !self.evaluator.eval(ctx, where_clause)?.as_bool() {
                return Ok(ResultSet::new(select_column_names(select, &[])));
            }
        }
        let mut row = Vec::with_capacity(select.columns.len());
        for column in &select.columns {
            row.push(self.evaluator.eval(ctx, &column.expr)?);
        }
        let mut result_set = ResultSet::new(select_column_names(select, &[]));
        result_set.rows.push(row);
        Ok(result_set)
    }

    /// Path (a): SELECT ... INTO #t.
    async fn execute_select_into(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        select: &SelectStatement,
    ) -> Result<()> {
        let target = select.into.clone().unwrap_or_default();
        if !is_temp_name(&target) {
            return Err(EngineError::UnsupportedStatement(format!(
                "SELECT INTO a non-temp table '{target}'"
            )));
        }

        let source = self.materialize_select(ctx, select).await?;

        // Column types are inferred from the first row; Unknown cells
        // fall back to VARCHAR.
        let mut columns = Vec::with_capacity(source.columns.len());
        for (i, name) in source.columns.iter().enumerate() {
            let ty = source
                .rows
                .first()
                .map_or(SqlType::VarChar, |row| match row[i].ty {
                    SqlType::Unknown => SqlType::VarChar,
                    ty => ty,
                });
            columns.push(crate::temp_table::TempColumn::new(name.clone(), ty));
        }

        let mut table = TempTable::new(&target, columns);
        let inserted = source.rows.len() as u64;
        for row in source.rows {
            table.insert_row(row.into_iter().map(Some).collect())?;
        }
        ctx.temp_tables.put(table);

        debug!(table = %target, rows = inserted, "SELECT INTO materialized");
        ctx.set_row_count(inserted);
        result.rows_affected += inserted;
        Ok(())
    }

    /// Path (b): SELECT @v = expr, ... The temp-table fast path reads
    /// only the first row and does not evaluate WHERE; this mirrors
    /// the dispatcher's historical behavior and is documented as a
    /// known limitation.
    async fn execute_select_assign(
        &mut self,
        ctx: &mut ExecutionContext,
        select: &SelectStatement,
    ) -> Result<()> {
        match select.from.as_ref().and_then(TableRef::base_name) {
            Some(name) if is_temp_name(name) => {
                let name = name.to_string();
                let assignments = {
                    let table = ddl::temp_table(&ctx.temp_tables, &name)?;
                    let Some(first_row) = table.rows.first() else {
                        ctx.set_row_count(0);
                        return Ok(());
                    };
                    let scope = row_scope(&table.column_names(), first_row);
                    let mut assignments = Vec::new();
                    for column in &select.columns {
                        if let Some(target) = &column.assign_to {
                            let value = self.evaluator.eval_row(ctx, &scope, &column.expr)?;
                            assignments.push((target.clone(), value));
                        }
                    }
                    assignments
                };
                for (target, value) in assignments {
                    self.set_variable(ctx, &target, value);
                }
                ctx.set_row_count(1);
            }
            Some(_) => {
                // Backend source: strip the assignment targets and
                // fetch the first row.
                let mut stripped = select.clone();
                for column in &mut stripped.columns {
                    column.assign_to = None;
                }
                let rendered = self.rewriter.render_select(&stripped);
                let output = self.send_query(ctx, &rendered).await?;
                let Some(row) = output.rows.into_iter().next() else {
                    ctx.set_row_count(0);
                    return Ok(());
                };
                for (column, value) in select.columns.iter().zip(row) {
                    if let Some(target) = &column.assign_to {
                        self.set_variable(ctx, target, value);
                    }
                }
                ctx.set_row_count(1);
            }
            None => {
                for column in &select.columns {
                    if let Some(target) = &column.assign_to {
                        let value = self.evaluator.eval(ctx, &column.expr)?;
                        self.set_variable(ctx, target, value);
                    }
                }
                ctx.set_row_count(1);
            }
        }
        Ok(())
    }

    /// Path (c): predicate scan over a temp table, with projection,
    /// simple aggregates, ORDER BY, and TOP.
    fn scan_temp_select(
        &self,
        ctx: &ExecutionContext,
        select: &SelectStatement,
        name: &str,
    ) -> Result<ResultSet> {
        let table = ddl::temp_table(&ctx.temp_tables, name)?;
        let column_names = table.column_names();

        let mut matching: Vec<RowScope> = Vec::new();
        let mut matching_rows: Vec<&Vec<Value>> = Vec::new();
        for row in &table.rows {
            let scope = row_scope(&column_names, row);
            let keep = match &select.where_clause {
                Some(predicate) => self.evaluator.eval_row(ctx, &scope, predicate)?.as_bool(),
                None => true,
            };
            if keep {
                matching.push(scope);
                matching_rows.push(row);
            }
        }

        if select_is_aggregate(select) {
            return self.aggregate_temp_select(ctx, select, &matching);
        }

        // ORDER BY over the matched rows.
        let mut order: Vec<usize> = (0..matching.len()).collect();
        if !select.order_by.is_empty() {
            let mut keys: Vec<Vec<Value>> = Vec::with_capacity(matching.len());
            for scope in &matching {
                let mut row_keys = Vec::with_capacity(select.order_by.len());
                for entry in &select.order_by {
                    row_keys.push(self.evaluator.eval_row(ctx, scope, &entry.expr)?);
                }
                keys.push(row_keys);
            }
            order.sort_by(|&a, &b| {
                for (i, entry) in select.order_by.iter().enumerate() {
                    let ordering = keys[a][i]
                        .compare(&keys[b][i])
                        .unwrap_or(core::cmp::Ordering::Equal);
                    let ordering = match entry.direction {
                        transact_core::ast::OrderDirection::Asc => ordering,
                        transact_core::ast::OrderDirection::Desc => ordering.reverse(),
                    };
                    if ordering != core::cmp::Ordering::Equal {
                        return ordering;
                    }
                }
                core::cmp::Ordering::Equal
            });
        }

        let limit = match &select.top {
            Some(expr) => self
                .evaluator
                .eval(ctx, expr)?
                .as_int()
                .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(0)),
            None => usize::MAX,
        };

        let names = select_column_names(select, &column_names);
        let mut result_set = ResultSet::new(names);
        for &index in order.iter().take(limit) {
            let scope = &matching[index];
            let mut out_row = Vec::new();
            for column in &select.columns {
                match &column.expr {
                    Expr::Wildcard { .. } => {
                        out_row.extend(matching_rows[index].iter().cloned());
                    }
                    expr => out_row.push(self.evaluator.eval_row(ctx, scope, expr)?),
                }
            }
            result_set.rows.push(out_row);
        }
        Ok(result_set)
    }

    /// Aggregate projection over matched temp rows: COUNT, SUM, AVG,
    /// MIN, MAX without GROUP BY.
    fn aggregate_temp_select(
        &self,
        ctx: &ExecutionContext,
        select: &SelectStatement,
        matching: &[RowScope],
    ) -> Result<ResultSet> {
        let mut names = Vec::new();
        let mut row = Vec::new();
        for column in &select.columns {
            let Expr::Function(call) = &column.expr else {
                return Err(EngineError::UnsupportedStatement(String::from(
                    "mixing aggregates and plain columns in a temp-table select",
                )));
            };
            names.push(
                column
                    .alias
                    .clone()
                    .unwrap_or_else(|| call.name.to_ascii_lowercase()),
            );
            row.push(self.evaluate_aggregate(ctx, call, matching)?);
        }
        let mut result_set = ResultSet::new(names);
        result_set.rows.push(row);
        Ok(result_set)
    }

    fn evaluate_aggregate(
        &self,
        ctx: &ExecutionContext,
        call: &FunctionCall,
        matching: &[RowScope],
    ) -> Result<Value> {
        let name = call.name.to_ascii_uppercase();
        let arg = call.args.first();

        if name == "COUNT" {
            let count = match arg {
                None | Some(Expr::Wildcard { .. }) => matching.len(),
                Some(expr) => {
                    let mut count = 0;
                    for scope in matching {
                        if !self.evaluator.eval_row(ctx, scope, expr)?.is_null() {
                            count += 1;
                        }
                    }
                    count
                }
            };
            return Ok(Value::int(count as i64));
        }

        let Some(expr) = arg else {
            return Err(EngineError::UnsupportedStatement(format!(
                "{name}() requires an argument"
            )));
        };

        let mut values = Vec::new();
        for scope in matching {
            let value = self.evaluator.eval_row(ctx, scope, expr)?;
            if !value.is_null() {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Ok(Value::null());
        }

        match name.as_str() {
            "SUM" | "AVG" => {
                let mut total = values[0].clone();
                for value in &values[1..] {
                    total = total.add(value)?;
                }
                if name == "AVG" {
                    total = total.div(&Value::int(values.len() as i64))?;
                }
                Ok(total)
            }
            "MIN" | "MAX" => {
                let mut best = values[0].clone();
                for value in &values[1..] {
                    let ordering = value.compare(&best);
                    let better = match name.as_str() {
                        "MIN" => ordering == Some(core::cmp::Ordering::Less),
                        _ => ordering == Some(core::cmp::Ordering::Greater),
                    };
                    if better {
                        best = value.clone();
                    }
                }
                Ok(best)
            }
            other => Err(EngineError::UnsupportedStatement(format!(
                "aggregate {other}()"
            ))),
        }
    }

    // ===============================================================
    // DML
    // ===============================================================

    async fn execute_insert(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        insert: &InsertStatement,
    ) -> Result<()> {
        if is_temp_name(&insert.table) {
            return self.insert_temp(ctx, result, insert).await;
        }

        let rendered = self.rewriter.render(&Statement::Insert(insert.clone()));
        let output = self.send_execute(ctx, &rendered).await?;
        self.record_exec_output(ctx, result, output);
        Ok(())
    }

    async fn insert_temp(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        insert: &InsertStatement,
    ) -> Result<()> {
        // Evaluate the source rows before touching the table.
        let value_rows: Vec<Vec<Value>> = match &insert.source {
            InsertSource::Values(rows) => {
                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut values = Vec::with_capacity(row.len());
                    for expr in row {
                        values.push(self.evaluator.eval(ctx, expr)?);
                    }
                    out.push(values);
                }
                out
            }
            InsertSource::Query(select) => self.materialize_select(ctx, select).await?.rows,
            InsertSource::DefaultValues => vec![vec![]],
        };

        let table = ctx
            .temp_tables
            .get_mut(&insert.table)
            .ok_or_else(|| EngineError::UndefinedObject(insert.table.clone()))?;

        // Map provided values onto table columns.
        let target_indexes: Vec<usize> = if insert.columns.is_empty() {
            Vec::new()
        } else {
            insert
                .columns
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| EngineError::UndefinedObject(name.clone()))
                })
                .collect::<Result<_>>()?
        };

        let mut last_identity = None;
        let inserted = value_rows.len() as u64;
        for values in value_rows {
            let mut provided: Vec<Option<Value>> = vec![None; table.columns.len()];
            if insert.columns.is_empty() {
                if matches!(insert.source, InsertSource::DefaultValues) {
                    // Leave everything to identity/defaults.
                } else if values.len() == table.columns.len() {
                    for (cell, value) in provided.iter_mut().zip(values) {
                        *cell = Some(value);
                    }
                } else {
                    // Without a column list, values bind to the
                    // non-identity columns in order.
                    let mut values = values.into_iter();
                    for (i, column) in table.columns.iter().enumerate() {
                        if column.identity.is_none() {
                            provided[i] = values.next();
                        }
                    }
                    if values.next().is_some() {
                        return Err(EngineError::Raised(SqlError::raised(
                            213,
                            format!(
                                "Column count mismatch on insert into '{}'",
                                insert.table
                            ),
                            16,
                            1,
                        )));
                    }
                }
            } else {
                for (&index, value) in target_indexes.iter().zip(values) {
                    provided[index] = Some(value);
                }
            }
            if let Some(id) = table.insert_row(provided)? {
                last_identity = Some(id);
            }
        }

        if let Some(id) = last_identity {
            ctx.set_identity(id);
            result.last_insert_id = Some(id);
        }
        ctx.set_row_count(inserted);
        result.rows_affected += inserted;
        Ok(())
    }

    async fn execute_update(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        update: &UpdateStatement,
    ) -> Result<()> {
        if !is_temp_name(&update.table) {
            let rendered = self.rewriter.render(&Statement::Update(update.clone()));
            let output = self.send_execute(ctx, &rendered).await?;
            self.record_exec_output(ctx, result, output);
            return Ok(());
        }

        // Phase 1: evaluate the predicate and new values against each
        // row. Phase 2: apply.
        let changes = {
            let table = ddl::temp_table(&ctx.temp_tables, &update.table)?;
            let column_names = table.column_names();
            let mut changes: Vec<(usize, Vec<(usize, Value)>)> = Vec::new();
            for (row_index, row) in table.rows.iter().enumerate() {
                let scope = row_scope(&column_names, row);
                let matched = match &update.where_clause {
                    Some(predicate) => {
                        self.evaluator.eval_row(ctx, &scope, predicate)?.as_bool()
                    }
                    None => true,
                };
                if !matched {
                    continue;
                }
                let mut cells = Vec::with_capacity(update.assignments.len());
                for assignment in &update.assignments {
                    let index = table.column_index(&assignment.column).ok_or_else(|| {
                        EngineError::UndefinedObject(assignment.column.clone())
                    })?;
                    let value = self.evaluator.eval_row(ctx, &scope, &assignment.value)?;
                    cells.push((index, value));
                }
                changes.push((row_index, cells));
            }
            changes
        };

        let affected = changes.len() as u64;
        let table = ctx
            .temp_tables
            .get_mut(&update.table)
            .ok_or_else(|| EngineError::UndefinedObject(update.table.clone()))?;
        for (row_index, cells) in changes {
            for (column_index, value) in cells {
                table.rows[row_index][column_index] = value;
            }
        }

        ctx.set_row_count(affected);
        result.rows_affected += affected;
        Ok(())
    }

    async fn execute_delete(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        delete: &DeleteStatement,
    ) -> Result<()> {
        if !is_temp_name(&delete.table) {
            let rendered = self.rewriter.render(&Statement::Delete(delete.clone()));
            let output = self.send_execute(ctx, &rendered).await?;
            self.record_exec_output(ctx, result, output);
            return Ok(());
        }

        let doomed = {
            let table = ddl::temp_table(&ctx.temp_tables, &delete.table)?;
            let column_names = table.column_names();
            let mut doomed = Vec::new();
            for (row_index, row) in table.rows.iter().enumerate() {
                let matched = match &delete.where_clause {
                    Some(predicate) => {
                        let scope = row_scope(&column_names, row);
                        self.evaluator.eval_row(ctx, &scope, predicate)?.as_bool()
                    }
                    None => true,
                };
                if matched {
                    doomed.push(row_index);
                }
            }
            doomed
        };

        let affected = doomed.len() as u64;
        let table = ctx
            .temp_tables
            .get_mut(&delete.table)
            .ok_or_else(|| EngineError::UndefinedObject(delete.table.clone()))?;
        for row_index in doomed.into_iter().rev() {
            table.rows.remove(row_index);
        }

        ctx.set_row_count(affected);
        result.rows_affected += affected;
        Ok(())
    }

    /// WITH statements forward to the backend after variable
    /// substitution, dispatched by their inner statement type.
    async fn execute_with(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        with: &WithStatement,
    ) -> Result<()> {
        let rendered = self.rewriter.render(&Statement::With(with.clone()));
        match with.body.as_ref() {
            Statement::Select(_) => {
                let output = self.send_query(ctx, &rendered).await?;
                ctx.set_row_count(output.rows.len() as u64);
                result.result_sets.push(ResultSet {
                    columns: output.columns,
                    rows: output.rows,
                });
            }
            _ => {
                let output = self.send_execute(ctx, &rendered).await?;
                self.record_exec_output(ctx, result, output);
            }
        }
        Ok(())
    }

    // ===============================================================
    // DECLARE / control flow
    // ===============================================================

    fn execute_declare(&mut self, ctx: &mut ExecutionContext, items: &[DeclareItem]) -> Result<()> {
        for item in items {
            match item {
                DeclareItem::Scalar {
                    name,
                    data_type,
                    init,
                } => {
                    let value = match init {
                        Some(expr) => self
                            .evaluator
                            .eval(ctx, expr)?
                            .cast(data_type.value_type())?,
                        None => Value::null_of(data_type.value_type()),
                    };
                    self.set_variable(ctx, name, value);
                }
                DeclareItem::Table { name, columns } => {
                    ddl::declare_table_variable(ctx, &self.evaluator, name, columns)?;
                }
            }
        }
        Ok(())
    }

    async fn execute_if(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        stmt: &IfStatement,
    ) -> Result<Flow> {
        let condition = self.evaluator.eval(ctx, &stmt.condition)?;
        if condition.as_bool() {
            self.execute_statement(ctx, result, &stmt.then_branch).await
        } else if let Some(else_branch) = &stmt.else_branch {
            self.execute_statement(ctx, result, else_branch).await
        } else {
            Ok(Flow::Normal)
        }
    }

    async fn execute_while(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        stmt: &WhileStatement,
    ) -> Result<Flow> {
        let mut iterations: u32 = 0;
        loop {
            if ctx.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            if ctx.has_returned {
                return Ok(Flow::Normal);
            }
            if !self.evaluator.eval(ctx, &stmt.condition)?.as_bool() {
                return Ok(Flow::Normal);
            }
            if iterations >= WHILE_ITERATION_CAP {
                warn!(cap = WHILE_ITERATION_CAP, "WHILE loop hit iteration cap");
                return Err(EngineError::LoopLimitExceeded);
            }
            iterations += 1;

            match self.execute_statement(ctx, result, &stmt.body).await? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Continue | Flow::Normal => {}
            }
        }
    }

    // ===============================================================
    // Error handling
    // ===============================================================

    async fn execute_try_catch(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        stmt: &TryCatchStatement,
    ) -> Result<Flow> {
        ctx.errors.try_depth += 1;
        let outcome = self.execute_statements(ctx, result, &stmt.try_block).await;
        ctx.errors.try_depth -= 1;

        match outcome {
            Ok(flow) => Ok(flow),
            Err(error) if error.is_catchable() => {
                let sql_error = error.to_sql_error();
                debug!(
                    number = sql_error.number,
                    message = %sql_error.message,
                    "Error caught by TRY scope"
                );
                ctx.record_error(sql_error.clone());

                // Errors inside CATCH propagate to the enclosing
                // scope; the catch context nests for TRY-inside-TRY.
                let saved = ctx.errors.catch_error.replace(sql_error);
                let catch_outcome =
                    self.execute_statements(ctx, result, &stmt.catch_block).await;
                ctx.errors.catch_error = saved;
                catch_outcome
            }
            Err(error) => Err(error),
        }
    }

    fn execute_throw(
        &mut self,
        ctx: &mut ExecutionContext,
        args: Option<&ThrowArgs>,
    ) -> Result<EngineError> {
        match args {
            Some(args) => {
                let number = self
                    .evaluator
                    .eval(ctx, &args.number)?
                    .as_int()
                    .unwrap_or(50000) as i32;
                let message = self.evaluator.eval(ctx, &args.message)?.as_string();
                let state = self.evaluator.eval(ctx, &args.state)?.as_int().unwrap_or(1) as i32;
                Ok(EngineError::Thrown(SqlError::raised(
                    number, message, 16, state,
                )))
            }
            None => match &ctx.errors.catch_error {
                // Bare THROW re-raises the error being handled.
                Some(error) => Ok(EngineError::Thrown(error.clone())),
                None => Ok(EngineError::UnsupportedStatement(String::from(
                    "THROW without arguments outside of a CATCH block",
                ))),
            },
        }
    }

    fn execute_raiserror(
        &mut self,
        ctx: &mut ExecutionContext,
        stmt: &RaiserrorStatement,
    ) -> Result<()> {
        let template = self.evaluator.eval(ctx, &stmt.message)?.as_string();
        let severity = self
            .evaluator
            .eval(ctx, &stmt.severity)?
            .as_int()
            .unwrap_or(0) as i32;
        let state = self.evaluator.eval(ctx, &stmt.state)?.as_int().unwrap_or(1) as i32;

        let mut args = Vec::with_capacity(stmt.args.len());
        for expr in &stmt.args {
            args.push(self.evaluator.eval(ctx, expr)?);
        }
        let message = format_raiserror(&template, &args);

        if severity >= 16 {
            return Err(EngineError::Raised(SqlError::raised(
                50000, message, severity, state,
            )));
        }
        // Low-severity RAISERROR is informational.
        warn!(severity, state, message = %message, "RAISERROR");
        println!("{message}");
        Ok(())
    }

    // ===============================================================
    // EXEC
    // ===============================================================

    async fn execute_exec(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        exec: &ExecuteStatement,
    ) -> Result<()> {
        match exec {
            ExecuteStatement::DynamicSql(expr) => {
                // Dynamic SQL re-enters at the same nesting level; it
                // is not a procedure call.
                let sql = self.evaluator.eval(ctx, expr)?.as_string();
                debug!(sql = %sql, "EXEC dynamic SQL");
                let program = Parser::new(&sql).parse_program()?;
                self.execute_statements(ctx, result, &program.statements)
                    .await?;
                Ok(())
            }
            ExecuteStatement::Procedure { name, params } => {
                if name.eq_ignore_ascii_case("sp_executesql") {
                    return self.execute_sp_executesql(ctx, result, params).await;
                }
                self.execute_procedure_call(ctx, result, name, params).await
            }
        }
    }

    async fn execute_sp_executesql(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        params: &[ExecParameter],
    ) -> Result<()> {
        let Some(first) = params.first() else {
            return Err(EngineError::MissingRequiredParameter {
                procedure: String::from("sp_executesql"),
                parameter: String::from("@stmt"),
            });
        };
        let sql = self.evaluator.eval(ctx, &first.value)?.as_string();

        let declared = match params.get(1) {
            Some(second) => {
                let defs = self.evaluator.eval(ctx, &second.value)?.as_string();
                Parser::new(&defs).parse_parameter_definitions()?
            }
            None => Vec::new(),
        };

        // Remaining arguments bind in order to the declared names.
        for (i, arg) in params.iter().skip(2).enumerate() {
            let Some(param) = declared.get(i) else {
                return Err(EngineError::TooManyParameters(String::from(
                    "sp_executesql",
                )));
            };
            let value = self.evaluator.eval(ctx, &arg.value)?;
            self.set_variable(ctx, &param.name, value);
        }

        debug!(sql = %sql, params = declared.len(), "sp_executesql");
        let program = Parser::new(&sql).parse_program()?;
        self.execute_statements(ctx, result, &program.statements)
            .await?;
        Ok(())
    }

    /// EXEC of a named procedure: resolve, bind, run in a child
    /// interpreter over the same session, copy OUTPUT values back.
    async fn execute_procedure_call(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        name: &str,
        params: &[ExecParameter],
    ) -> Result<()> {
        if self.nesting_level >= MAX_NESTING_LEVEL {
            return Err(EngineError::NestingLimitExceeded);
        }
        let Some(resolver) = self.resolver.clone() else {
            return Err(EngineError::NoResolverConfigured(name.to_string()));
        };
        let resolved = resolver.resolve(name, &self.database)?;

        // Bind call-site arguments in the caller's environment,
        // remembering the caller variable behind each OUTPUT.
        let mut bound: Vec<(String, Value)> = Vec::new();
        let mut outputs: Vec<(String, String)> = Vec::new();
        for (i, arg) in params.iter().enumerate() {
            let target = match &arg.name {
                Some(arg_name) => resolved
                    .params
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(arg_name))
                    .ok_or_else(|| EngineError::InvalidParameterRef(arg_name.clone()))?
                    .name
                    .clone(),
                None => resolved
                    .params
                    .get(i)
                    .ok_or_else(|| EngineError::TooManyParameters(name.to_string()))?
                    .name
                    .clone(),
            };
            if arg.output {
                let Expr::Variable(caller_var) = &arg.value else {
                    return Err(EngineError::InvalidParameterRef(format!(
                        "OUTPUT argument for {target} must be a variable"
                    )));
                };
                outputs.push((target.clone(), caller_var.clone()));
            }
            let value = self.evaluator.eval(ctx, &arg.value)?;
            bound.push((target, value));
        }

        // Defaults for declared parameters the call site omitted.
        for param in &resolved.params {
            let already = bound
                .iter()
                .any(|(bound_name, _)| bound_name.eq_ignore_ascii_case(&param.name));
            if already {
                continue;
            }
            if let Some(default) = &param.default {
                let value = self.evaluator.eval(ctx, default)?;
                bound.push((param.name.clone(), value));
            } else if param.output {
                bound.push((
                    param.name.clone(),
                    Value::null_of(param.data_type.value_type()),
                ));
            } else {
                return Err(EngineError::MissingRequiredParameter {
                    procedure: name.to_string(),
                    parameter: param.name.clone(),
                });
            }
        }

        info!(
            procedure = %name,
            nesting = self.nesting_level + 1,
            "Executing stored procedure"
        );

        // The child interpreter shares the execution context; only
        // the wrapper state changes.
        let mut child = Interpreter::new(Arc::clone(&self.backend), self.dialect);
        child.resolver = Some(resolver);
        child.database = self.database.clone();
        child.nesting_level = self.nesting_level + 1;
        for (param_name, value) in bound {
            child.set_variable(ctx, &param_name, value);
        }

        let saved_returned = ctx.has_returned;
        let saved_return_value = ctx.return_value;
        ctx.has_returned = false;
        ctx.return_value = None;
        ctx.set_nest_level(child.nesting_level);

        let program = Parser::new(&resolved.source).parse_program();
        let outcome = match program {
            Ok(program) => child
                .execute_statements(ctx, result, &program.statements)
                .await
                .map(|_| ()),
            Err(e) => Err(e.into()),
        };

        ctx.set_nest_level(self.nesting_level);
        if ctx.return_value.is_some() {
            result.return_value = ctx.return_value;
        }
        ctx.has_returned = saved_returned;
        ctx.return_value = saved_return_value;
        outcome?;

        // Copy OUTPUT parameters back to the remembered caller
        // variables.
        for (param_name, caller_var) in outputs {
            if let Some(value) = ctx.variables.get(&param_name).cloned() {
                self.set_variable(ctx, &caller_var, value);
            }
        }
        Ok(())
    }

    /// Runs a CREATE PROCEDURE statement as an execution entry point:
    /// parameters bind from prior variable state or their defaults,
    /// then the body executes. Nested EXEC lands here after resolving
    /// the procedure source.
    async fn execute_procedure_body(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        proc: &CreateProcedureStatement,
    ) -> Result<()> {
        for param in &proc.params {
            if self.get_variable(ctx, &param.name).is_some() {
                continue;
            }
            let value = match &param.default {
                Some(expr) => self.evaluator.eval(ctx, expr)?,
                None => Value::null_of(param.data_type.value_type()),
            };
            self.set_variable(ctx, &param.name, value);
        }
        self.execute_statements(ctx, result, &proc.body).await?;
        Ok(())
    }

    // ===============================================================
    // Cursors
    // ===============================================================

    fn execute_declare_cursor(&self, ctx: &mut ExecutionContext, stmt: &DeclareCursorStatement) {
        debug!(cursor = %stmt.name, kind = ?stmt.kind, "DECLARE CURSOR");
        ctx.cursors.declare(Cursor::declare(stmt));
    }

    /// OPEN materializes the cursor query. Variable substitution
    /// happens now, not at DECLARE, so late-bound variables take their
    /// OPEN-time values. Re-OPEN of a closed cursor re-executes the
    /// query.
    async fn execute_open_cursor(&mut self, ctx: &mut ExecutionContext, name: &str) -> Result<()> {
        let query = ctx
            .cursors
            .get(name)
            .ok_or_else(|| EngineError::UndefinedObject(name.to_string()))?
            .query
            .clone();

        let statement = Parser::new(&query).parse_statement()?;
        let Statement::Select(select) = statement else {
            return Err(EngineError::UnsupportedStatement(String::from(
                "cursor query must be a SELECT",
            )));
        };

        let result_set = self.materialize_select(ctx, &select).await?;
        debug!(cursor = %name, rows = result_set.rows.len(), "OPEN CURSOR");

        let cursor = ctx
            .cursors
            .get_mut(name)
            .ok_or_else(|| EngineError::UndefinedObject(name.to_string()))?;
        cursor.open(result_set.columns, result_set.rows);
        Ok(())
    }

    /// FETCH updates `@@FETCH_STATUS` before anything else observes
    /// it, assigns INTO variables in column order, and produces a
    /// one-row result set when no INTO list is given.
    fn execute_fetch(
        &mut self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        stmt: &FetchStatement,
    ) -> Result<()> {
        let (status, row, columns) = {
            let cursor = ctx
                .cursors
                .get_mut(&stmt.cursor)
                .ok_or_else(|| EngineError::UndefinedObject(stmt.cursor.clone()))?;
            let (status, row) = cursor.fetch(stmt.direction)?;
            (status, row, cursor.columns.clone())
        };

        ctx.set_fetch_status(status);

        let Some(row) = row else {
            return Ok(());
        };

        if stmt.into.is_empty() {
            let mut result_set = ResultSet::new(columns);
            result_set.rows.push(row);
            result.result_sets.push(result_set);
            return Ok(());
        }

        // Assign INTO variables in column order; surplus variables
        // are left untouched.
        for (variable, value) in stmt.into.iter().zip(row) {
            self.set_variable(ctx, variable, value);
        }
        Ok(())
    }

    // ===============================================================
    // Backend plumbing
    // ===============================================================

    async fn send_query(
        &self,
        ctx: &ExecutionContext,
        rendered: &str,
    ) -> Result<crate::backend::QueryOutput> {
        let normalized = self.normalizer.normalize(rendered);
        let (sql, args) = self.normalizer.bind(&normalized, ctx, &self.evaluator)?;
        debug!(sql = %sql, params = args.len(), "Backend query");
        self.backend.query(&sql, &args).await
    }

    async fn send_execute(&self, ctx: &ExecutionContext, rendered: &str) -> Result<ExecOutput> {
        let normalized = self.normalizer.normalize(rendered);
        let (sql, args) = self.normalizer.bind(&normalized, ctx, &self.evaluator)?;
        debug!(sql = %sql, params = args.len(), "Backend execute");
        self.backend.execute(&sql, &args).await
    }

    async fn finish_ddl(&self, ctx: &mut ExecutionContext, outcome: DdlOutcome) -> Result<()> {
        match outcome {
            DdlOutcome::Handled => {
                ctx.set_row_count(0);
                Ok(())
            }
            DdlOutcome::Forward(sql) => {
                let (sql, args) = self.normalizer.bind(&sql, ctx, &self.evaluator)?;
                debug!(sql = %sql, "Backend DDL");
                self.backend.execute(&sql, &args).await?;
                ctx.set_row_count(0);
                Ok(())
            }
        }
    }

    fn record_exec_output(
        &self,
        ctx: &mut ExecutionContext,
        result: &mut ExecutionResult,
        output: ExecOutput,
    ) {
        ctx.set_row_count(output.rows_affected);
        result.rows_affected += output.rows_affected;
        if let Some(id) = output.last_insert_id {
            ctx.set_identity(id);
            result.last_insert_id = Some(id);
        }
    }
}

/// Column names for a select's output: alias, else the column's own
/// name, else a positional placeholder; wildcards expand to the
/// source table's columns.
fn select_column_names(select: &SelectStatement, table_columns: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    for (i, column) in select.columns.iter().enumerate() {
        if let Some(alias) = &column.alias {
            names.push(alias.clone());
            continue;
        }
        match &column.expr {
            Expr::Wildcard { .. } => names.extend(table_columns.iter().cloned()),
            Expr::Column { name, .. } => names.push(name.clone()),
            Expr::Variable(name) => names.push(name.clone()),
            _ => names.push(format!("column{}", i + 1)),
        }
    }
    names
}

/// True when every select column is an aggregate function call.
fn select_is_aggregate(select: &SelectStatement) -> bool {
    !select.columns.is_empty()
        && select.columns.iter().all(|column| {
            matches!(
                &column.expr,
                Expr::Function(call) if matches!(
                    call.name.to_ascii_uppercase().as_str(),
                    "COUNT" | "SUM" | "AVG" | "MIN" | "MAX"
                )
            )
        })
}

/// RAISERROR printf-style substitution: each argument replaces the
/// next `%s` / `%d` / `%i` marker.
fn format_raiserror(template: &str, args: &[Value]) -> String {
    let mut message = String::from(template);
    for arg in args {
        let Some(position) = ["%s", "%d", "%i"]
            .iter()
            .filter_map(|marker| message.find(marker))
            .min()
        else {
            break;
        };
        message.replace_range(position..position + 2, &arg.as_string());
    }
    message
}
