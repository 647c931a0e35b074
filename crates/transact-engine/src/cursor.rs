//! Scrollable cursors.
//!
//! A cursor captures its query text verbatim at DECLARE time and
//! materializes rows at OPEN. FETCH moves a 0-based position and
//! reports its outcome through `@@FETCH_STATUS`: 0 on success, -1 at
//! the ends or on a bad absolute position, -2 when a keyset row has
//! gone missing (never produced by the materialized implementation).

use std::collections::HashMap;

use transact_core::ast::{CursorKind, CursorLock, CursorScope, DeclareCursorStatement, FetchDirection};
use transact_core::Value;

use crate::error::{EngineError, Result};

/// Fetch succeeded.
pub const FETCH_SUCCESS: i32 = 0;
/// Fetch ran past either end, or the absolute position was invalid.
pub const FETCH_PAST_END: i32 = -1;
/// The fetched row no longer exists (keyset cursors).
pub const FETCH_ROW_MISSING: i32 = -2;

/// A declared cursor instance.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Cursor name.
    pub name: String,
    /// Query text, verbatim, with `@var` references unsubstituted.
    pub query: String,
    /// GLOBAL / LOCAL scope.
    pub scope: CursorScope,
    /// Declared cursor type. Dynamic and fast-forward cursors are
    /// materialized exactly like static ones; only the observable
    /// FETCH behavior is contractual.
    pub kind: CursorKind,
    /// Whether SCROLL was declared (non-NEXT fetch directions).
    pub scroll: bool,
    /// Declared lock mode; carried but not acted on.
    pub lock: CursorLock,
    /// Column names, filled at OPEN.
    pub columns: Vec<String>,
    /// Materialized rows, filled at OPEN.
    pub rows: Vec<Vec<Value>>,
    /// Current position: -1 before the first row, `rows.len()` after
    /// the last.
    position: i64,
    /// Whether the cursor is open.
    pub open: bool,
}

impl Cursor {
    /// Creates a closed cursor from its declaration.
    #[must_use]
    pub fn declare(statement: &DeclareCursorStatement) -> Self {
        // FAST_FORWARD and FORWARD_ONLY imply NEXT-only fetching
        // unless SCROLL was given explicitly.
        let scroll = statement.scroll
            || matches!(
                statement.kind,
                CursorKind::Static | CursorKind::Keyset | CursorKind::Dynamic
            );
        Self {
            name: statement.name.clone(),
            query: statement.query.clone(),
            scope: statement.scope,
            kind: statement.kind,
            scroll,
            lock: statement.lock,
            columns: Vec::new(),
            rows: Vec::new(),
            position: -1,
            open: false,
        }
    }

    /// Fills the cursor with a materialized result and positions it
    /// before the first row.
    pub fn open(&mut self, columns: Vec<String>, rows: Vec<Vec<Value>>) {
        self.columns = columns;
        self.rows = rows;
        self.position = -1;
        self.open = true;
    }

    /// Releases the materialized rows but keeps the declaration.
    pub fn close(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.position = -1;
        self.open = false;
    }

    /// Moves the cursor and returns `(status, row)`.
    ///
    /// Non-NEXT directions require a scrollable cursor.
    pub fn fetch(&mut self, direction: FetchDirection) -> Result<(i32, Option<Vec<Value>>)> {
        if !self.open {
            return Err(EngineError::CursorNotOpen(self.name.clone()));
        }
        if !self.scroll && direction != FetchDirection::Next {
            return Err(EngineError::InvalidCursorDirection(
                format!("{direction:?}").to_ascii_uppercase(),
                self.name.clone(),
            ));
        }

        let len = i64::try_from(self.rows.len()).unwrap_or(i64::MAX);
        let target = match direction {
            FetchDirection::Next => self.position + 1,
            FetchDirection::Prior => self.position - 1,
            FetchDirection::First => 0,
            FetchDirection::Last => len - 1,
            // ABSOLUTE is 1-based; negative counts back from the end;
            // 0 lands before the first row.
            FetchDirection::Absolute(n) => {
                if n > 0 {
                    n - 1
                } else if n < 0 {
                    len + n
                } else {
                    -1
                }
            }
            FetchDirection::Relative(n) => self.position + n,
        };

        if target < 0 {
            self.position = -1;
            return Ok((FETCH_PAST_END, None));
        }
        if target >= len {
            self.position = len;
            return Ok((FETCH_PAST_END, None));
        }

        self.position = target;
        #[allow(clippy::cast_sign_loss)]
        let row = self.rows[target as usize].clone();
        Ok((FETCH_SUCCESS, Some(row)))
    }
}

/// The session's cursor store, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CursorStore {
    cursors: HashMap<String, Cursor>,
}

impl CursorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cursor declaration, replacing any previous cursor
    /// with the same name.
    pub fn declare(&mut self, cursor: Cursor) {
        self.cursors.insert(cursor.name.to_ascii_lowercase(), cursor);
    }

    /// Looks up a cursor.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cursor> {
        self.cursors.get(&name.to_ascii_lowercase())
    }

    /// Looks up a cursor mutably.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Cursor> {
        self.cursors.get_mut(&name.to_ascii_lowercase())
    }

    /// Removes a cursor; returns whether it existed.
    pub fn deallocate(&mut self, name: &str) -> bool {
        self.cursors.remove(&name.to_ascii_lowercase()).is_some()
    }
}
