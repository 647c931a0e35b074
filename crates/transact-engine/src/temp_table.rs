//! In-memory temp tables and table variables.
//!
//! Tables named `#t` (session temp) or `@t` (table variable) live
//! here; DML against them never reaches the backend. The store keys
//! names case-insensitively.

use std::collections::HashMap;

use transact_core::{SqlType, Value};

use crate::error::{EngineError, Result};

/// Identity column state: configuration plus the next value to
/// assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityState {
    /// First value.
    pub seed: i64,
    /// Step.
    pub increment: i64,
    /// Next value to assign.
    pub next: i64,
}

impl IdentityState {
    /// Creates identity state positioned at its seed.
    #[must_use]
    pub const fn new(seed: i64, increment: i64) -> Self {
        Self {
            seed,
            increment,
            next: seed,
        }
    }

    /// Takes the next identity value and advances.
    pub fn take(&mut self) -> i64 {
        let value = self.next;
        self.next += self.increment;
        value
    }
}

/// One column of a temp table.
#[derive(Debug, Clone, PartialEq)]
pub struct TempColumn {
    /// Column name.
    pub name: String,
    /// Value type tag.
    pub ty: SqlType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Declared maximum length for character/binary columns.
    pub max_length: Option<u32>,
    /// Declared precision for decimal columns.
    pub precision: Option<u16>,
    /// Declared scale for decimal columns.
    pub scale: Option<u16>,
    /// Identity assignment state, if the column is IDENTITY.
    pub identity: Option<IdentityState>,
    /// Default value applied when an INSERT omits the column.
    pub default: Option<Value>,
}

impl TempColumn {
    /// Creates a plain nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
            identity: None,
            default: None,
        }
    }
}

/// An in-memory table. Row arity always equals the column count.
#[derive(Debug, Clone, Default)]
pub struct TempTable {
    /// Table name as declared (with its `#` / `@` sigil).
    pub name: String,
    /// Ordered columns.
    pub columns: Vec<TempColumn>,
    /// Row data.
    pub rows: Vec<Vec<Value>>,
}

impl TempTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<TempColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Finds a column index by name, case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Inserts one row. `provided` is aligned to the table's columns;
    /// `None` cells take the identity value, the declared default, or
    /// a typed NULL, in that order.
    ///
    /// Returns the identity value assigned for this row, if the table
    /// has an identity column.
    pub fn insert_row(&mut self, provided: Vec<Option<Value>>) -> Result<Option<i64>> {
        if provided.len() != self.columns.len() {
            return Err(EngineError::Raised(crate::error::SqlError::raised(
                213,
                format!(
                    "Column count mismatch on insert into '{}': expected {}, got {}",
                    self.name,
                    self.columns.len(),
                    provided.len()
                ),
                16,
                1,
            )));
        }

        let mut identity_value = None;
        let mut row = Vec::with_capacity(self.columns.len());
        for (column, cell) in self.columns.iter_mut().zip(provided) {
            let value = match cell {
                Some(value) => value,
                None => {
                    if let Some(identity) = column.identity.as_mut() {
                        let id = identity.take();
                        identity_value = Some(id);
                        Value::bigint(id)
                    } else if let Some(default) = &column.default {
                        default.clone()
                    } else {
                        Value::null_of(column.ty)
                    }
                }
            };
            row.push(value);
        }
        self.rows.push(row);
        Ok(identity_value)
    }

    /// Removes all rows. The identity counter is kept, matching
    /// TRUNCATE-without-reseed semantics.
    pub fn truncate(&mut self) {
        self.rows.clear();
    }
}

/// The session's temp-table store.
#[derive(Debug, Clone, Default)]
pub struct TempTableStore {
    tables: HashMap<String, TempTable>,
}

/// Returns true when a table name addresses the temp store: `#t`,
/// `##t`, or `@t` (but never `@@sysvar`).
#[must_use]
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with('#') || (name.starts_with('@') && !name.starts_with("@@"))
}

impl TempTableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any previous one with the same
    /// name.
    pub fn put(&mut self, table: TempTable) {
        self.tables.insert(table.name.to_ascii_lowercase(), table);
    }

    /// Looks up a table.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TempTable> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Looks up a table mutably.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TempTable> {
        self.tables.get_mut(&name.to_ascii_lowercase())
    }

    /// Returns true if the table exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes a table; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.tables.remove(&name.to_ascii_lowercase()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TempTable {
        let mut id = TempColumn::new("id", SqlType::Int);
        id.identity = Some(IdentityState::new(1, 1));
        id.nullable = false;
        let name = TempColumn::new("name", SqlType::NVarChar);
        TempTable::new("#people", vec![id, name])
    }

    #[test]
    fn test_is_temp_name() {
        assert!(is_temp_name("#t"));
        assert!(is_temp_name("##shared"));
        assert!(is_temp_name("@tab"));
        assert!(!is_temp_name("@@ROWCOUNT"));
        assert!(!is_temp_name("users"));
    }

    #[test]
    fn test_identity_assignment_is_monotonic() {
        let mut table = people();
        let id1 = table
            .insert_row(vec![None, Some(Value::nvarchar("a"))])
            .unwrap();
        let id2 = table
            .insert_row(vec![None, Some(Value::nvarchar("b"))])
            .unwrap();
        assert_eq!(id1, Some(1));
        assert_eq!(id2, Some(2));
        assert_eq!(table.rows[1][0], Value::bigint(2));
    }

    #[test]
    fn test_truncate_keeps_identity_counter() {
        let mut table = people();
        table
            .insert_row(vec![None, Some(Value::nvarchar("a"))])
            .unwrap();
        table.truncate();
        assert!(table.rows.is_empty());
        // Second truncate is idempotent.
        table.truncate();
        assert!(table.rows.is_empty());

        let id = table
            .insert_row(vec![None, Some(Value::nvarchar("b"))])
            .unwrap();
        assert_eq!(id, Some(2));
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let mut table = people();
        let err = table.insert_row(vec![None]).unwrap_err();
        assert!(matches!(err, EngineError::Raised(ref e) if e.number == 213));
    }

    #[test]
    fn test_missing_cell_takes_default_then_null() {
        let mut table = people();
        table.columns[1].default = Some(Value::nvarchar("anonymous"));
        table.insert_row(vec![None, None]).unwrap();
        assert_eq!(table.rows[0][1], Value::nvarchar("anonymous"));

        table.columns[1].default = None;
        table.insert_row(vec![None, None]).unwrap();
        assert!(table.rows[1][1].is_null());
        assert_eq!(table.rows[1][1].ty, SqlType::NVarChar);
    }

    #[test]
    fn test_store_is_case_insensitive() {
        let mut store = TempTableStore::new();
        store.put(TempTable::new("#Orders", vec![]));
        assert!(store.contains("#orders"));
        assert!(store.get("#ORDERS").is_some());
        assert!(store.remove("#orders"));
        assert!(!store.contains("#orders"));
    }
}
