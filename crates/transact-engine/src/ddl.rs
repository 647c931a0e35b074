//! DDL routing.
//!
//! CREATE/DROP/TRUNCATE against `#temp` and `@tablevar` names are
//! served from the in-memory store; everything else is rendered,
//! type-normalized, and handed back for the backend.

use tracing::debug;
use transact_core::ast::{ColumnDef, CreateTableStatement, Statement};
use transact_core::Dialect;

use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::eval::Evaluator;
use crate::normalizer::SqlNormalizer;
use crate::rewriter::AstRewriter;
use crate::temp_table::{is_temp_name, IdentityState, TempColumn, TempTable, TempTableStore};

/// What the interpreter should do after DDL routing: nothing more, or
/// send the returned SQL to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlOutcome {
    /// Served from the temp store.
    Handled,
    /// Forward this SQL to the backend.
    Forward(String),
}

/// Routes DDL between the temp-table store and the backend.
#[derive(Debug, Clone, Copy)]
pub struct DdlHandler {
    dialect: Dialect,
}

impl DdlHandler {
    /// Creates a handler for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// CREATE TABLE: `#t` goes to the temp store, the rest to the
    /// backend with dialect type aliases applied.
    pub fn create_table(
        &self,
        ctx: &mut ExecutionContext,
        evaluator: &Evaluator,
        statement: &CreateTableStatement,
    ) -> Result<DdlOutcome> {
        if is_temp_name(&statement.name) {
            debug!(table = %statement.name, "Creating temp table");
            let table = build_temp_table(ctx, evaluator, &statement.name, &statement.columns)?;
            ctx.temp_tables.put(table);
            return Ok(DdlOutcome::Handled);
        }

        let rendered = AstRewriter::new(self.dialect)
            .render(&Statement::CreateTable(statement.clone()));
        let sql = SqlNormalizer::new(self.dialect).normalize_ddl(&rendered);
        debug!(sql = %sql, "Forwarding CREATE TABLE");
        Ok(DdlOutcome::Forward(sql))
    }

    /// DROP TABLE.
    pub fn drop_table(&self, ctx: &mut ExecutionContext, name: &str) -> Result<DdlOutcome> {
        if is_temp_name(name) {
            if !ctx.temp_tables.remove(name) {
                return Err(EngineError::UndefinedObject(name.to_string()));
            }
            return Ok(DdlOutcome::Handled);
        }
        Ok(DdlOutcome::Forward(format!("DROP TABLE {name}")))
    }

    /// TRUNCATE TABLE. Temp tables clear rows and keep their identity
    /// counters; backends without TRUNCATE get `DELETE FROM`.
    pub fn truncate_table(&self, ctx: &mut ExecutionContext, name: &str) -> Result<DdlOutcome> {
        if is_temp_name(name) {
            let table = ctx
                .temp_tables
                .get_mut(name)
                .ok_or_else(|| EngineError::UndefinedObject(name.to_string()))?;
            table.truncate();
            return Ok(DdlOutcome::Handled);
        }
        let sql = if self.dialect.supports_truncate() {
            format!("TRUNCATE TABLE {name}")
        } else {
            format!("DELETE FROM {name}")
        };
        Ok(DdlOutcome::Forward(sql))
    }
}

/// Builds a temp table from column definitions, evaluating DEFAULT
/// expressions once at creation time.
pub fn build_temp_table(
    ctx: &ExecutionContext,
    evaluator: &Evaluator,
    name: &str,
    columns: &[ColumnDef],
) -> Result<TempTable> {
    let mut temp_columns = Vec::with_capacity(columns.len());
    for def in columns {
        let mut column = TempColumn::new(def.name.clone(), def.data_type.value_type());
        column.nullable = def.nullable;
        column.max_length = def.data_type.max_length();
        let (precision, scale) = def.data_type.precision_scale();
        column.precision = precision;
        column.scale = scale;
        if let Some(identity) = &def.identity {
            column.identity = Some(IdentityState::new(identity.seed, identity.increment));
        }
        if let Some(default) = &def.default {
            column.default = Some(evaluator.eval(ctx, default)?);
        }
        temp_columns.push(column);
    }
    Ok(TempTable::new(name, temp_columns))
}

/// Convenience used by DECLARE @t TABLE: registers the table variable
/// directly.
pub fn declare_table_variable(
    ctx: &mut ExecutionContext,
    evaluator: &Evaluator,
    name: &str,
    columns: &[ColumnDef],
) -> Result<()> {
    let table = build_temp_table(ctx, evaluator, name, columns)?;
    ctx.temp_tables.put(table);
    Ok(())
}

/// Shared store access with a consistent missing-object error.
pub fn temp_table<'a>(store: &'a TempTableStore, name: &str) -> Result<&'a TempTable> {
    store
        .get(name)
        .ok_or_else(|| EngineError::UndefinedObject(name.to_string()))
}
