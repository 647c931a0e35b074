//! # transact-core
//!
//! Front end of the `transact` T-SQL runtime: a hand-written lexer and
//! recursive descent parser producing a procedural T-SQL AST, plus the
//! tagged [`value::Value`] runtime type and the backend
//! [`dialect::Dialect`] enum shared by the engine.
//!
//! ```rust
//! use transact_core::parser::Parser;
//! use transact_core::ast::Statement;
//!
//! let program = Parser::new("DECLARE @x INT = 5 SELECT @x + 1 AS n")
//!     .parse_program()
//!     .unwrap();
//! assert_eq!(program.statements.len(), 2);
//! assert!(matches!(program.statements[0], Statement::Declare(_)));
//! ```

pub mod ast;
pub mod dialect;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{Expr, Program, Statement};
pub use dialect::Dialect;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use value::{SqlType, Value, ValueData, ValueError};
