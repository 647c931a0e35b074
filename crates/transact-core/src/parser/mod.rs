//! T-SQL parser.
//!
//! A hand-written recursive descent parser with Pratt expression
//! parsing for the procedural T-SQL subset the runtime interprets.
//!
//! # Parsing approach
//!
//! Statements are parsed by dedicated recursive-descent methods.
//! Expressions use a Pratt (top-down operator precedence) parser that
//! handles prefix and infix operators with correct precedence and
//! associativity.
//!
//! # Supported statements
//!
//! | Group | Statements |
//! |-------|------------|
//! | DQL/DML | `SELECT` (TOP, INTO, `@v = expr` assignment columns), `INSERT`, `UPDATE`, `DELETE`, `WITH` |
//! | Variables | `DECLARE` (scalar, `TABLE`), `SET @v = expr`, session `SET ... ON/OFF` |
//! | Control flow | `IF`/`ELSE`, `WHILE`, `BEGIN ... END`, `BREAK`, `CONTINUE`, `RETURN` |
//! | Errors | `BEGIN TRY`/`BEGIN CATCH`, `THROW`, `RAISERROR` |
//! | Procedures | `EXEC` (dynamic string, named, `sp_executesql`), `CREATE PROCEDURE` |
//! | DDL | `CREATE TABLE`, `DROP TABLE`, `TRUNCATE TABLE` |
//! | Transactions | `BEGIN`/`COMMIT`/`ROLLBACK TRANSACTION` |
//! | Cursors | `DECLARE ... CURSOR FOR`, `OPEN`, `FETCH`, `CLOSE`, `DEALLOCATE` |
//!
//! # Expressions
//!
//! Literals (integers, floats, strings, `N'...'`, `0x...`, `NULL`),
//! `@var` references, column references (`col`, `t.col`, `*`, `t.*`),
//! arithmetic (`+` doubling as string concatenation), comparisons,
//! `AND`/`OR`/`NOT`, `[NOT] LIKE`, `[NOT] IN`, `[NOT] BETWEEN`,
//! `IS [NOT] NULL`, `CASE` (simple and searched), `CAST`/`CONVERT`,
//! `EXISTS`, scalar subqueries, and function calls.
//!
//! # Not supported
//!
//! Set operations (`UNION`/`INTERSECT`/`EXCEPT`), window functions,
//! `GOTO`/labels, `MERGE`, `ALTER`, and multi-statement triggers.

mod core;
mod error;
mod pratt;

pub use self::core::Parser;
pub use error::ParseError;
