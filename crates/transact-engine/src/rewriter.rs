//! AST-level dialect rewriting.
//!
//! Transforms the string normalizer cannot reach reliably live here;
//! today that is the `TOP n` -> `LIMIT n` move. Rewritten statements
//! render back to SQL text through the AST `Display` impls, and the
//! string normalizer runs on that text afterwards.

use transact_core::ast::{InsertSource, SelectStatement, Statement, TableRef, WithStatement};
use transact_core::Dialect;

/// Rewrites statements for the target dialect before rendering.
#[derive(Debug, Clone, Copy)]
pub struct AstRewriter {
    dialect: Dialect,
}

impl AstRewriter {
    /// Creates a rewriter for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Rewrites and renders a statement to backend SQL text.
    #[must_use]
    pub fn render(&self, statement: &Statement) -> String {
        self.rewrite(statement).to_string()
    }

    /// Rewrites and renders a SELECT to backend SQL text.
    #[must_use]
    pub fn render_select(&self, select: &SelectStatement) -> String {
        self.rewrite_select(select).to_string()
    }

    /// Returns a dialect-adjusted copy of the statement.
    #[must_use]
    pub fn rewrite(&self, statement: &Statement) -> Statement {
        match statement {
            Statement::Select(select) => Statement::Select(self.rewrite_select(select)),
            Statement::Insert(insert) => {
                let mut insert = insert.clone();
                if let InsertSource::Query(query) = &insert.source {
                    insert.source = InsertSource::Query(Box::new(self.rewrite_select(query)));
                }
                Statement::Insert(insert)
            }
            Statement::With(with) => {
                let rewritten = WithStatement {
                    ctes: with
                        .ctes
                        .iter()
                        .map(|cte| {
                            let mut cte = cte.clone();
                            cte.query = self.rewrite_select(&cte.query);
                            cte
                        })
                        .collect(),
                    body: Box::new(self.rewrite(&with.body)),
                };
                Statement::With(rewritten)
            }
            other => other.clone(),
        }
    }

    /// Moves `TOP n` onto the fetch slot for LIMIT-style dialects;
    /// SQL Server keeps TOP. Derived tables are rewritten too.
    #[must_use]
    pub fn rewrite_select(&self, select: &SelectStatement) -> SelectStatement {
        let mut select = select.clone();
        if self.dialect.uses_limit() {
            if let Some(top) = select.top.take() {
                select.fetch = Some(top);
            }
        }
        if let Some(from) = select.from.take() {
            select.from = Some(self.rewrite_table_ref(from));
        }
        select
    }

    fn rewrite_table_ref(&self, table_ref: TableRef) -> TableRef {
        match table_ref {
            TableRef::Subquery { query, alias } => TableRef::Subquery {
                query: Box::new(self.rewrite_select(&query)),
                alias,
            },
            TableRef::Join { left, mut join } => {
                join.table = self.rewrite_table_ref(join.table);
                TableRef::Join {
                    left: Box::new(self.rewrite_table_ref(*left)),
                    join,
                }
            }
            plain => plain,
        }
    }
}
