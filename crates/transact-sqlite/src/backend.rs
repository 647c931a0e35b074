//! The sqlx-backed SQLite driver.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;
use transact_core::{Value, ValueData};
use transact_engine::{Backend, EngineError, ExecOutput, QueryOutput, Result};

/// A SQLite backend over a `sqlx` pool.
///
/// Transactions issue plain `BEGIN`/`COMMIT`/`ROLLBACK` statements on
/// the pool, so pools serving transactional sessions should be sized
/// to a single connection.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to a SQLite database. Use `":memory:"` for an
    /// in-memory database.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(wrap)?;
        Ok(Self { pool })
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn wrap(error: sqlx::Error) -> EngineError {
    EngineError::Backend(error.to_string())
}

/// Binds one engine value onto a sqlx query.
fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match &value.data {
        ValueData::Null => query.bind(None::<String>),
        ValueData::Int(i) => query.bind(*i),
        ValueData::Float(f) => query.bind(*f),
        ValueData::String(s) => query.bind(s.clone()),
        ValueData::Bytes(b) => query.bind(b.clone()),
        // Date/time values travel as their canonical text forms,
        // matching the TEXT affinity the DDL normalizer assigns.
        ValueData::DateTime(dt) => query.bind(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        ValueData::Date(d) => query.bind(d.format("%Y-%m-%d").to_string()),
        ValueData::Time(t) => query.bind(t.format("%H:%M:%S").to_string()),
    }
}

/// Decodes one SQLite row into engine values using the declared
/// storage class of each cell.
fn decode_row(row: &SqliteRow) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(row.len());
    for i in 0..row.len() {
        let raw = row.try_get_raw(i).map_err(wrap)?;
        if raw.is_null() {
            values.push(Value::null());
            continue;
        }
        let type_name = raw.type_info().name().to_string();
        let value = match type_name.as_str() {
            "INTEGER" | "BOOLEAN" => Value::bigint(row.try_get::<i64, _>(i).map_err(wrap)?),
            "REAL" => Value::float(row.try_get::<f64, _>(i).map_err(wrap)?),
            "BLOB" => Value::binary(row.try_get::<Vec<u8>, _>(i).map_err(wrap)?),
            _ => Value::nvarchar(row.try_get::<String, _>(i).map_err(wrap)?),
        };
        values.push(value);
    }
    Ok(values)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryOutput> {
        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(wrap)?;

        let columns = rows.first().map_or_else(Vec::new, |row| {
            row.columns()
                .iter()
                .map(|column| String::from(column.name()))
                .collect()
        });
        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows {
            decoded.push(decode_row(row)?);
        }
        debug!(rows = decoded.len(), "SQLite query");
        Ok(QueryOutput {
            columns,
            rows: decoded,
        })
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecOutput> {
        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value);
        }
        let outcome = query.execute(&self.pool).await.map_err(wrap)?;

        let last_insert_id = match outcome.last_insert_rowid() {
            0 => None,
            id => Some(id),
        };
        Ok(ExecOutput {
            rows_affected: outcome.rows_affected(),
            last_insert_id,
        })
    }

    async fn begin(&self) -> Result<()> {
        sqlx::query("BEGIN").execute(&self.pool).await.map_err(wrap)?;
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        sqlx::query("COMMIT").execute(&self.pool).await.map_err(wrap)?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        sqlx::query("ROLLBACK")
            .execute(&self.pool)
            .await
            .map_err(wrap)?;
        Ok(())
    }
}
