//! Procedure resolution.
//!
//! The engine never stores procedure sources itself; the host hands it
//! a resolver that maps a procedure name (and current database) to
//! source text plus the declared parameter list. A HashMap-backed
//! [`MemoryResolver`] is provided for hosts and tests.

use std::collections::HashMap;

use transact_core::ast::{ProcedureParam, Statement};
use transact_core::Parser;

use crate::error::{EngineError, Result};

/// A resolved procedure: its source and declared parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProcedure {
    /// The procedure source (a `CREATE PROCEDURE` batch).
    pub source: String,
    /// Declared parameters in order.
    pub params: Vec<ProcedureParam>,
}

/// Maps procedure names to their sources.
pub trait ProcedureResolver: Send + Sync {
    /// Resolves `name` within `database`.
    fn resolve(&self, name: &str, database: &str) -> Result<ResolvedProcedure>;
}

/// An in-memory resolver keyed by lowercase procedure name.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    procedures: HashMap<String, ResolvedProcedure>,
}

impl MemoryResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `CREATE PROCEDURE` source, indexing it by the
    /// procedure's declared name. Returns that name.
    pub fn register(&mut self, source: &str) -> Result<String> {
        let program = Parser::new(source).parse_program()?;
        let Some(Statement::CreateProcedure(proc)) = program
            .statements
            .iter()
            .find(|s| matches!(s, Statement::CreateProcedure(_)))
        else {
            return Err(EngineError::Parse(String::from(
                "procedure source does not contain CREATE PROCEDURE",
            )));
        };
        let name = proc.name.clone();
        self.procedures.insert(
            name.to_ascii_lowercase(),
            ResolvedProcedure {
                source: String::from(source),
                params: proc.params.clone(),
            },
        );
        Ok(name)
    }
}

impl ProcedureResolver for MemoryResolver {
    fn resolve(&self, name: &str, _database: &str) -> Result<ResolvedProcedure> {
        // Lookups ignore any schema qualifier.
        let key = name
            .rsplit('.')
            .next()
            .unwrap_or(name)
            .to_ascii_lowercase();
        self.procedures
            .get(&key)
            .cloned()
            .ok_or_else(|| EngineError::UndefinedObject(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut resolver = MemoryResolver::new();
        let name = resolver
            .register("CREATE PROCEDURE Double @x INT, @y INT OUTPUT AS SET @y = @x * 2")
            .unwrap();
        assert_eq!(name, "Double");

        let resolved = resolver.resolve("double", "mydb").unwrap();
        assert_eq!(resolved.params.len(), 2);
        assert!(resolved.params[1].output);

        // Schema qualifiers are ignored on lookup.
        assert!(resolver.resolve("dbo.Double", "mydb").is_ok());
    }

    #[test]
    fn test_unknown_procedure() {
        let resolver = MemoryResolver::new();
        assert!(matches!(
            resolver.resolve("nope", "db"),
            Err(EngineError::UndefinedObject(_))
        ));
    }

    #[test]
    fn test_register_rejects_non_procedure_source() {
        let mut resolver = MemoryResolver::new();
        assert!(matches!(
            resolver.register("SELECT 1"),
            Err(EngineError::Parse(_))
        ));
    }
}
