//! Expression evaluation.
//!
//! The evaluator is a pure function of an expression and the visible
//! scopes: the session environment (consulted first), the
//! interpreter's locals, and an optional row scope used while
//! scanning temp tables. It never touches the backend; subqueries in
//! interpreted positions are rejected.

use std::collections::HashMap;

use chrono::{Local, Utc};
use transact_core::ast::{BinaryOp, Expr, FunctionCall, Literal, UnaryOp};
use transact_core::{SqlType, Value};
use uuid::Uuid;

use crate::context::ExecutionContext;
use crate::environment::VariableEnvironment;
use crate::error::{EngineError, Result};

/// Column values visible while scanning a table row, keyed by
/// lowercase column name.
pub type RowScope = HashMap<String, Value>;

/// Builds a row scope from parallel column/value slices.
#[must_use]
pub fn row_scope(columns: &[String], row: &[Value]) -> RowScope {
    columns
        .iter()
        .zip(row)
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect()
}

/// Expression evaluator with its local variable scope.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    /// Interpreter-local bindings, consulted after the session
    /// environment.
    pub locals: VariableEnvironment,
}

impl Evaluator {
    /// Creates an evaluator with empty locals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates an expression with no row scope.
    pub fn eval(&self, ctx: &ExecutionContext, expr: &Expr) -> Result<Value> {
        self.eval_in(ctx, None, expr)
    }

    /// Evaluates an expression against a row scope.
    pub fn eval_row(&self, ctx: &ExecutionContext, row: &RowScope, expr: &Expr) -> Result<Value> {
        self.eval_in(ctx, Some(row), expr)
    }

    /// Resolves a variable: session first, then locals.
    pub fn variable(&self, ctx: &ExecutionContext, name: &str) -> Result<Value> {
        ctx.variables
            .get(name)
            .or_else(|| self.locals.get(name))
            .cloned()
            .ok_or_else(|| EngineError::UndefinedVariable(name.to_string()))
    }

    fn eval_in(
        &self,
        ctx: &ExecutionContext,
        row: Option<&RowScope>,
        expr: &Expr,
    ) -> Result<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Variable(name) => self.variable(ctx, name),
            Expr::Column { name, .. } => {
                let Some(row) = row else {
                    return Err(EngineError::UndefinedObject(name.clone()));
                };
                row.get(&name.to_ascii_lowercase())
                    .cloned()
                    .ok_or_else(|| EngineError::UndefinedObject(name.clone()))
            }
            Expr::Binary { left, op, right } => self.eval_binary(ctx, row, left, *op, right),
            Expr::Unary { op, operand } => {
                let value = self.eval_in(ctx, row, operand)?;
                match op {
                    UnaryOp::Neg => Value::int(0).sub(&value).map_err(EngineError::from),
                    UnaryOp::Not => {
                        if value.is_null() {
                            Ok(Value::null_of(SqlType::Bit))
                        } else {
                            Ok(Value::bit(!value.as_bool()))
                        }
                    }
                }
            }
            Expr::Function(call) => self.eval_function(ctx, row, call),
            Expr::IsNull { expr, negated } => {
                let value = self.eval_in(ctx, row, expr)?;
                Ok(Value::bit(value.is_null() != *negated))
            }
            Expr::In {
                expr,
                list,
                negated,
            } => {
                let needle = self.eval_in(ctx, row, expr)?;
                if needle.is_null() {
                    return Ok(Value::null_of(SqlType::Bit));
                }
                let mut found = false;
                for candidate in list {
                    let value = self.eval_in(ctx, row, candidate)?;
                    if needle.compare(&value) == Some(core::cmp::Ordering::Equal) {
                        found = true;
                        break;
                    }
                }
                Ok(Value::bit(found != *negated))
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = self.eval_in(ctx, row, expr)?;
                let low = self.eval_in(ctx, row, low)?;
                let high = self.eval_in(ctx, row, high)?;
                let (Some(lo), Some(hi)) = (value.compare(&low), value.compare(&high)) else {
                    return Ok(Value::null_of(SqlType::Bit));
                };
                let inside = lo != core::cmp::Ordering::Less && hi != core::cmp::Ordering::Greater;
                Ok(Value::bit(inside != *negated))
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let operand_value = operand
                    .as_ref()
                    .map(|op| self.eval_in(ctx, row, op))
                    .transpose()?;
                for (when, then) in when_clauses {
                    let matched = match &operand_value {
                        Some(operand_value) => {
                            let when_value = self.eval_in(ctx, row, when)?;
                            operand_value.compare(&when_value)
                                == Some(core::cmp::Ordering::Equal)
                        }
                        None => self.eval_in(ctx, row, when)?.as_bool(),
                    };
                    if matched {
                        return self.eval_in(ctx, row, then);
                    }
                }
                match else_clause {
                    Some(else_expr) => self.eval_in(ctx, row, else_expr),
                    None => Ok(Value::null()),
                }
            }
            Expr::Cast { expr, data_type } => {
                let value = self.eval_in(ctx, row, expr)?;
                value.cast(data_type.value_type()).map_err(EngineError::from)
            }
            Expr::Paren(inner) => self.eval_in(ctx, row, inner),
            Expr::Subquery(_) | Expr::Exists(_) => Err(EngineError::UnsupportedStatement(
                String::from("subquery in an interpreted expression"),
            )),
            Expr::Wildcard { .. } => Err(EngineError::UnsupportedStatement(String::from(
                "wildcard outside of a select list",
            ))),
        }
    }

    fn eval_binary(
        &self,
        ctx: &ExecutionContext,
        row: Option<&RowScope>,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
    ) -> Result<Value> {
        // AND/OR short-circuit; NULL is not truthy.
        if op == BinaryOp::And {
            let lhs = self.eval_in(ctx, row, left)?;
            if !lhs.as_bool() {
                return Ok(Value::bit(false));
            }
            return Ok(Value::bit(self.eval_in(ctx, row, right)?.as_bool()));
        }
        if op == BinaryOp::Or {
            let lhs = self.eval_in(ctx, row, left)?;
            if lhs.as_bool() {
                return Ok(Value::bit(true));
            }
            return Ok(Value::bit(self.eval_in(ctx, row, right)?.as_bool()));
        }

        let lhs = self.eval_in(ctx, row, left)?;
        let rhs = self.eval_in(ctx, row, right)?;

        match op {
            BinaryOp::Add => lhs.add(&rhs).map_err(EngineError::from),
            BinaryOp::Sub => lhs.sub(&rhs).map_err(EngineError::from),
            BinaryOp::Mul => lhs.mul(&rhs).map_err(EngineError::from),
            BinaryOp::Div => lhs.div(&rhs).map_err(EngineError::from),
            BinaryOp::Mod => lhs.modulo(&rhs).map_err(EngineError::from),
            BinaryOp::Like => {
                if lhs.is_null() || rhs.is_null() {
                    return Ok(Value::null_of(SqlType::Bit));
                }
                Ok(Value::bit(like_match(&lhs.as_string(), &rhs.as_string())))
            }
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => {
                // Comparison against NULL is unknown, which is not
                // truthy.
                let Some(ordering) = lhs.compare(&rhs) else {
                    return Ok(Value::null_of(SqlType::Bit));
                };
                let result = match op {
                    BinaryOp::Eq => ordering == core::cmp::Ordering::Equal,
                    BinaryOp::NotEq => ordering != core::cmp::Ordering::Equal,
                    BinaryOp::Lt => ordering == core::cmp::Ordering::Less,
                    BinaryOp::LtEq => ordering != core::cmp::Ordering::Greater,
                    BinaryOp::Gt => ordering == core::cmp::Ordering::Greater,
                    BinaryOp::GtEq => ordering != core::cmp::Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Value::bit(result))
            }
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn eval_function(
        &self,
        ctx: &ExecutionContext,
        row: Option<&RowScope>,
        call: &FunctionCall,
    ) -> Result<Value> {
        let name = call.name.to_ascii_uppercase();
        let arg = |i: usize| -> Result<Value> {
            call.args
                .get(i)
                .ok_or_else(|| {
                    EngineError::UnsupportedStatement(format!(
                        "{name}() requires at least {} argument(s)",
                        i + 1
                    ))
                })
                .and_then(|expr| self.eval_in(ctx, row, expr))
        };

        match name.as_str() {
            "LEN" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(Value::null_of(SqlType::Int));
                }
                // LEN ignores trailing spaces, per T-SQL.
                Ok(Value::int(value.as_string().trim_end().chars().count() as i64))
            }
            "DATALENGTH" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(Value::null_of(SqlType::Int));
                }
                Ok(Value::int(value.as_string().len() as i64))
            }
            "ISNULL" => {
                let value = arg(0)?;
                if value.is_null() {
                    arg(1)
                } else {
                    Ok(value)
                }
            }
            "COALESCE" => {
                for expr in &call.args {
                    let value = self.eval_in(ctx, row, expr)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Value::null())
            }
            "NULLIF" => {
                let first = arg(0)?;
                let second = arg(1)?;
                if first.compare(&second) == Some(core::cmp::Ordering::Equal) {
                    Ok(Value::null_of(first.ty))
                } else {
                    Ok(first)
                }
            }
            "GETDATE" | "SYSDATETIME" => Ok(Value::datetime(Local::now().naive_local())),
            "GETUTCDATE" | "SYSUTCDATETIME" => Ok(Value::datetime(Utc::now().naive_utc())),
            "NEWID" => Ok(Value {
                ty: SqlType::UniqueIdentifier,
                data: transact_core::ValueData::String(
                    Uuid::new_v4().to_string().to_ascii_uppercase(),
                ),
            }),
            "UPPER" => Ok(string_fn(&arg(0)?, |s| s.to_uppercase())),
            "LOWER" => Ok(string_fn(&arg(0)?, |s| s.to_lowercase())),
            "LTRIM" => Ok(string_fn(&arg(0)?, |s| s.trim_start().to_string())),
            "RTRIM" => Ok(string_fn(&arg(0)?, |s| s.trim_end().to_string())),
            "TRIM" => Ok(string_fn(&arg(0)?, |s| s.trim().to_string())),
            "REVERSE" => Ok(string_fn(&arg(0)?, |s| s.chars().rev().collect())),
            "SUBSTRING" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(Value::null_of(SqlType::VarChar));
                }
                let text = value.as_string();
                let start = arg(1)?.as_int().unwrap_or(1).max(1) as usize;
                let length = arg(2)?.as_int().unwrap_or(0).max(0) as usize;
                let result: String =
                    text.chars().skip(start - 1).take(length).collect();
                Ok(Value::varchar(result))
            }
            "REPLACE" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(Value::null_of(SqlType::VarChar));
                }
                let from = arg(1)?.as_string();
                let to = arg(2)?.as_string();
                Ok(Value::varchar(value.as_string().replace(&from, &to)))
            }
            "CHARINDEX" => {
                let needle = arg(0)?;
                let haystack = arg(1)?;
                if needle.is_null() || haystack.is_null() {
                    return Ok(Value::null_of(SqlType::Int));
                }
                let start = if call.args.len() > 2 {
                    arg(2)?.as_int().unwrap_or(1).max(1) as usize - 1
                } else {
                    0
                };
                let haystack = haystack.as_string();
                let found = haystack
                    .char_indices()
                    .skip(start)
                    .position(|(i, _)| haystack[i..].starts_with(&needle.as_string()));
                Ok(Value::int(match found {
                    // CHARINDEX is 1-based; 0 means not found.
                    Some(offset) => (start + offset + 1) as i64,
                    None => 0,
                }))
            }
            "LEFT" => {
                let value = arg(0)?;
                let n = arg(1)?.as_int().unwrap_or(0).max(0) as usize;
                Ok(string_fn(&value, |s| s.chars().take(n).collect()))
            }
            "RIGHT" => {
                let value = arg(0)?;
                let n = arg(1)?.as_int().unwrap_or(0).max(0) as usize;
                Ok(string_fn(&value, |s| {
                    let chars: Vec<char> = s.chars().collect();
                    chars[chars.len().saturating_sub(n)..].iter().collect()
                }))
            }
            "ABS" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(value);
                }
                match value.as_int() {
                    Some(i) if value.ty.is_integer() => Ok(Value::int(i.abs())),
                    _ => Ok(Value::float(value.as_float().unwrap_or(0.0).abs())),
                }
            }
            "ROUND" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(value);
                }
                let digits = arg(1)?.as_int().unwrap_or(0);
                let factor = 10f64.powi(digits as i32);
                let rounded = (value.as_float().unwrap_or(0.0) * factor).round() / factor;
                Ok(Value::float(rounded))
            }
            "FLOOR" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(value);
                }
                Ok(Value::int(value.as_float().unwrap_or(0.0).floor() as i64))
            }
            "CEILING" => {
                let value = arg(0)?;
                if value.is_null() {
                    return Ok(value);
                }
                Ok(Value::int(value.as_float().unwrap_or(0.0).ceil() as i64))
            }
            "ERROR_MESSAGE" => Ok(catch_field(ctx, |e| Value::nvarchar(e.message.clone()))),
            "ERROR_NUMBER" => Ok(catch_field(ctx, |e| Value::int(i64::from(e.number)))),
            "ERROR_SEVERITY" => Ok(catch_field(ctx, |e| Value::int(i64::from(e.severity)))),
            "ERROR_STATE" => Ok(catch_field(ctx, |e| Value::int(i64::from(e.state)))),
            "ERROR_LINE" => Ok(catch_field(ctx, |e| Value::int(i64::from(e.line)))),
            "ERROR_PROCEDURE" => Ok(catch_field(ctx, |e| {
                if e.procedure.is_empty() {
                    Value::null_of(SqlType::NVarChar)
                } else {
                    Value::nvarchar(e.procedure.clone())
                }
            })),
            "COUNT" | "SUM" | "AVG" | "MIN" | "MAX" => Err(EngineError::UnsupportedStatement(
                format!("aggregate {name}() outside of a select list"),
            )),
            other => Err(EngineError::UnsupportedStatement(format!(
                "function {other}()"
            ))),
        }
    }
}

/// Converts an AST literal into a runtime value.
#[must_use]
pub fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(i) => Value::int(*i),
        Literal::Float(f) => Value::float(*f),
        Literal::String(s) => Value::nvarchar(s.clone()),
        Literal::Binary(b) => Value::binary(b.clone()),
        Literal::Null => Value::null(),
    }
}

fn string_fn(value: &Value, f: impl Fn(&str) -> String) -> Value {
    if value.is_null() {
        return Value::null_of(SqlType::VarChar);
    }
    Value {
        ty: if value.ty.is_string() {
            value.ty
        } else {
            SqlType::VarChar
        },
        data: transact_core::ValueData::String(f(&value.as_string())),
    }
}

fn catch_field(ctx: &ExecutionContext, f: impl Fn(&crate::error::SqlError) -> Value) -> Value {
    match &ctx.errors.catch_error {
        Some(error) => f(error),
        None => Value::null(),
    }
}

/// SQL LIKE matching: `%` matches any run, `_` matches one character.
/// Matching is case-insensitive, following the common collation
/// default.
#[must_use]
pub fn like_match(text: &str, pattern: &str) -> bool {
    fn matches(text: &[char], pattern: &[char]) -> bool {
        match pattern.first() {
            None => text.is_empty(),
            Some('%') => {
                (0..=text.len()).any(|skip| matches(&text[skip..], &pattern[1..]))
            }
            Some('_') => !text.is_empty() && matches(&text[1..], &pattern[1..]),
            Some(c) => {
                text.first()
                    .is_some_and(|t| t.eq_ignore_ascii_case(c))
                    && matches(&text[1..], &pattern[1..])
            }
        }
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    matches(&text, &pattern)
}
