//! Backend SQL dialects.

use core::fmt;

/// The SQL flavor spoken by the target backend.
///
/// The dialect governs placeholder style, the AST-level TOP rewrite,
/// and the string-level function/type translation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Lowest-common-denominator SQL.
    #[default]
    Generic,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server (native T-SQL; mostly pass-through).
    SqlServer,
}

impl Dialect {
    /// Returns the positional parameter placeholder for `index`
    /// (0-based).
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index + 1),
            Self::MySql | Self::Sqlite => String::from("?"),
            Self::SqlServer => format!("@p{index}"),
            Self::Generic => format!("${}", index + 1),
        }
    }

    /// Returns true when the dialect expresses row limits with
    /// `LIMIT n` rather than `TOP n`.
    #[must_use]
    pub const fn uses_limit(&self) -> bool {
        !matches!(self, Self::SqlServer)
    }

    /// Returns true when the dialect supports TRUNCATE TABLE.
    #[must_use]
    pub const fn supports_truncate(&self) -> bool {
        !matches!(self, Self::Sqlite)
    }

    /// The display name of the dialect.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
