//! Variable environments.
//!
//! Names are canonicalized to lowercase and always carry their `@`
//! (or `@@`) prefix, so `@X` and `@x` are the same binding.

use std::collections::HashMap;

use transact_core::Value;

/// A set of named variable bindings.
#[derive(Debug, Clone, Default)]
pub struct VariableEnvironment {
    vars: HashMap<String, Value>,
}

/// Canonical form of a variable name: lowercase, `@`-prefixed.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with('@') {
        lower
    } else {
        format!("@{lower}")
    }
}

impl VariableEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable, replacing any previous value.
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(canonical_name(name), value);
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(&canonical_name(name))
    }

    /// Returns true if the variable is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(&canonical_name(name))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transact_core::SqlType;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut env = VariableEnvironment::new();
        env.set("@UserId", Value::int(7));
        assert_eq!(env.get("@userid"), Some(&Value::int(7)));
        assert_eq!(env.get("@USERID"), Some(&Value::int(7)));
    }

    #[test]
    fn test_prefix_is_added() {
        let mut env = VariableEnvironment::new();
        env.set("x", Value::int(1));
        assert!(env.contains("@x"));
    }

    #[test]
    fn test_system_variable_names() {
        let mut env = VariableEnvironment::new();
        env.set("@@ROWCOUNT", Value::bigint(3));
        assert_eq!(env.get("@@rowcount"), Some(&Value::bigint(3)));
        assert!(env.get("@rowcount").is_none());
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut env = VariableEnvironment::new();
        env.set("@v", Value::null_of(SqlType::Int));
        env.set("@v", Value::int(2));
        assert_eq!(env.get("@v"), Some(&Value::int(2)));
    }
}
