//! String-level dialect translation and parameter binding.
//!
//! Translation runs in two stages before SQL reaches the backend: the
//! AST rewriter handles placeholder-sensitive transforms, then this
//! normalizer rewrites function names, type aliases, and the string
//! concatenation operator with regular expressions. Normalization
//! runs *before* variable substitution so the patterns can see `@var`
//! tokens; keep that ordering.

use std::sync::LazyLock;

use regex::Regex;
use transact_core::{Dialect, Value};

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::eval::Evaluator;

static GETDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bGETDATE\s*\(\s*\)").unwrap());
static NEWID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bNEWID\s*\(\s*\)").unwrap());
static ISNULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bISNULL\s*\(").unwrap());
static LEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLEN\s*\(").unwrap());
/// CHARINDEX with two simple (paren- and comma-free) arguments; the
/// argument order differs per dialect.
static CHARINDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCHARINDEX\s*\(\s*([^,()]+?)\s*,\s*([^,()]+?)\s*\)").unwrap()
});

/// String-concatenation heuristic, left-marker form: a string
/// literal, `@var`, or placeholder followed by `+`. Numeric `+`
/// between plain identifiers is left alone. Acknowledged imperfect;
/// fires only in string-adjacent contexts.
static CONCAT_LEFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(@@?\w+|'(?:[^']|'')*'|\?)\s*\+").unwrap()
});

/// String-concatenation heuristic, right-marker form: `+` (or a
/// close-paren then `+`) followed by a string literal, `@var`, or
/// placeholder.
static CONCAT_RIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\s*(@@?\w+|'(?:[^']|'')*'|\?)").unwrap()
});

/// IDENTITY column property; SQLite's `INTEGER PRIMARY KEY` is
/// already auto-assigning, so the clause is dropped there.
static IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+IDENTITY\s*\(\s*-?\d+\s*,\s*-?\d+\s*\)").unwrap()
});

/// SQLite DDL type aliases, applied in order.
static SQLITE_TYPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let len = r"(?:\s*\(\s*(?:\d+|MAX)\s*(?:,\s*\d+\s*)?\))?";
    vec![
        (
            Regex::new(&format!(
                r"(?i)\b(?:BIGINT|INTEGER|SMALLINT|TINYINT|INT|BIT)\b{len}"
            ))
            .unwrap(),
            "INTEGER",
        ),
        (
            Regex::new(&format!(
                r"(?i)\b(?:NVARCHAR|VARCHAR|NCHAR|CHAR|NTEXT|TEXT|DATETIME2|SMALLDATETIME|DATETIME|DATE|TIME|UNIQUEIDENTIFIER)\b{len}"
            ))
            .unwrap(),
            "TEXT",
        ),
        (
            Regex::new(&format!(r"(?i)\b(?:VARBINARY|BINARY|IMAGE)\b{len}")).unwrap(),
            "BLOB",
        ),
    ]
});

/// Translates T-SQL-only constructs into the backend's dialect at the
/// string level.
#[derive(Debug, Clone, Copy)]
pub struct SqlNormalizer {
    dialect: Dialect,
}

impl SqlNormalizer {
    /// Creates a normalizer for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Rewrites function names and operators for the target dialect.
    #[must_use]
    pub fn normalize(&self, sql: &str) -> String {
        match self.dialect {
            Dialect::Sqlite => {
                let sql = GETDATE.replace_all(sql, "datetime('now')");
                let sql = NEWID.replace_all(&sql, "lower(hex(randomblob(16)))");
                let sql = ISNULL.replace_all(&sql, "IFNULL(");
                let sql = LEN.replace_all(&sql, "LENGTH(");
                // Argument swap: CHARINDEX(sub, str) -> INSTR(str, sub).
                let sql = CHARINDEX.replace_all(&sql, "INSTR($2, $1)");
                rewrite_concat(&sql)
            }
            Dialect::Postgres => {
                let sql = GETDATE.replace_all(sql, "NOW()");
                let sql = NEWID.replace_all(&sql, "gen_random_uuid()");
                let sql = ISNULL.replace_all(&sql, "COALESCE(");
                let sql = LEN.replace_all(&sql, "LENGTH(");
                CHARINDEX.replace_all(&sql, "POSITION($1 IN $2)").into_owned()
            }
            Dialect::MySql => {
                let sql = GETDATE.replace_all(sql, "NOW()");
                let sql = NEWID.replace_all(&sql, "UUID()");
                let sql = ISNULL.replace_all(&sql, "IFNULL(");
                let sql = LEN.replace_all(&sql, "CHAR_LENGTH(");
                CHARINDEX.replace_all(&sql, "LOCATE($1, $2)").into_owned()
            }
            Dialect::SqlServer | Dialect::Generic => String::from(sql),
        }
    }

    /// Rewrites DDL type names for the target dialect.
    #[must_use]
    pub fn normalize_ddl(&self, sql: &str) -> String {
        match self.dialect {
            Dialect::Sqlite => {
                let mut sql = IDENTITY.replace_all(sql, "").into_owned();
                for (pattern, replacement) in SQLITE_TYPES.iter() {
                    sql = pattern.replace_all(&sql, *replacement).into_owned();
                }
                sql
            }
            _ => String::from(sql),
        }
    }

    /// Replaces every `@ident` token (never `@@ident`) with the
    /// dialect's positional placeholder, collecting variable values
    /// in order. `@@system` variables are inlined textually, quoted
    /// and escaped for string types. Unknown variables are left
    /// untouched so that a later stage (or the backend) can report
    /// them.
    ///
    /// The scan is quote-aware: nothing inside a `'...'` literal is
    /// substituted.
    pub fn bind(
        &self,
        sql: &str,
        ctx: &ExecutionContext,
        evaluator: &Evaluator,
    ) -> Result<(String, Vec<Value>)> {
        let mut out = String::with_capacity(sql.len());
        let mut args: Vec<Value> = Vec::new();
        let mut chars = sql.char_indices().peekable();
        let mut in_string = false;

        while let Some((i, c)) = chars.next() {
            if in_string {
                out.push(c);
                if c == '\'' {
                    // A doubled quote stays inside the literal.
                    if chars.peek().is_some_and(|&(_, next)| next == '\'') {
                        let (_, next) = chars.next().unwrap();
                        out.push(next);
                    } else {
                        in_string = false;
                    }
                }
                continue;
            }

            match c {
                '\'' => {
                    in_string = true;
                    out.push(c);
                }
                '@' => {
                    let system = chars.peek().is_some_and(|&(_, next)| next == '@');
                    let start = i;
                    if system {
                        chars.next();
                    }
                    let mut end = sql.len();
                    while let Some(&(j, next)) = chars.peek() {
                        if next.is_alphanumeric() || next == '_' || next == '$' {
                            chars.next();
                        } else {
                            end = j;
                            break;
                        }
                    }
                    if chars.peek().is_none() {
                        end = sql.len();
                    }
                    let token = &sql[start..end];

                    if system {
                        // Inline system variables textually.
                        match evaluator.variable(ctx, token) {
                            Ok(value) => out.push_str(&value.to_sql_literal()),
                            Err(_) => out.push_str(token),
                        }
                    } else {
                        match evaluator.variable(ctx, token) {
                            Ok(value) => {
                                out.push_str(&self.dialect.placeholder(args.len()));
                                args.push(value);
                            }
                            Err(_) => out.push_str(token),
                        }
                    }
                }
                _ => out.push(c),
            }
        }

        Ok((out, args))
    }
}

/// Applies the `+` -> `||` concatenation heuristic. `@@sysvars` inline
/// as numbers for the counters, so a `+` adjacent to one is left as
/// arithmetic.
fn rewrite_concat(sql: &str) -> String {
    let pass = CONCAT_LEFT.replace_all(sql, |caps: &regex::Captures<'_>| {
        let marker = &caps[1];
        if marker.starts_with("@@") {
            caps[0].to_string()
        } else {
            format!("{marker} ||")
        }
    });
    CONCAT_RIGHT
        .replace_all(&pass, |caps: &regex::Captures<'_>| {
            let marker = &caps[1];
            if marker.starts_with("@@") {
                caps[0].to_string()
            } else {
                format!("|| {marker}")
            }
        })
        .into_owned()
}
