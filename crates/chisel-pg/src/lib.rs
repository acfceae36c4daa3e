//! # chisel-pg
//!
//! The PostgreSQL [`Executor`] implementation, backed by an sqlx
//! connection pool. Statements arrive fully compiled with `$1`-style
//! parameters; this crate only binds arguments, dispatches, and decodes
//! result cells back into [`Value`]s.

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use tracing::debug;

use chisel_core::{ExecuteError, Executor, Rows, Value};

/// Executor over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Connects to the database and returns an executor over a fresh pool.
    ///
    /// # Errors
    ///
    /// Connection failures, propagated verbatim.
    pub async fn connect(url: &str) -> Result<Self, ExecuteError> {
        let pool = PgPoolOptions::new()
            .connect(url)
            .await
            .map_err(|e| ExecuteError(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn bind<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        args: &'q [Value],
    ) -> Result<sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>, ExecuteError>
    {
        for arg in args {
            query = match arg {
                Value::Null => query.bind(Option::<i64>::None),
                Value::Integer(n) => query.bind(n),
                Value::Boolean(b) => query.bind(b),
                Value::Text(s) => query.bind(s.as_str()),
                Value::Record(r) => {
                    return Err(ExecuteError(format!(
                        "unresolved record argument for model {}",
                        r.model()
                    )))
                }
            };
        }
        Ok(query)
    }
}

impl Executor for PgExecutor {
    async fn execute(&self, statement: &str, args: &[Value]) -> Result<u64, ExecuteError> {
        debug!(statement, args = args.len(), "executing");
        let query = Self::bind(sqlx::query(statement), args)?;
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| ExecuteError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn query(&self, statement: &str, args: &[Value]) -> Result<Rows, ExecuteError> {
        debug!(statement, args = args.len(), "querying");
        let query = Self::bind(sqlx::query(statement), args)?;
        let pg_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExecuteError(e.to_string()))?;

        let columns = pg_rows.first().map_or_else(Vec::new, |row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        });
        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            rows.push(decode_row(pg_row)?);
        }
        Ok(Rows::new(columns, rows))
    }
}

/// Decodes one row cell by cell, folding the physical integer widths onto
/// [`Value::Integer`].
fn decode_row(row: &PgRow) -> Result<Vec<Value>, ExecuteError> {
    let mut values = Vec::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| v.map_or(Value::Null, |n| Value::Integer(i64::from(n)))),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(|v| v.map_or(Value::Null, |n| Value::Integer(i64::from(n)))),
            "INT8" => row
                .try_get::<Option<i64>, _>(index)
                .map(|v| v.map_or(Value::Null, Value::Integer)),
            "BOOL" => row
                .try_get::<Option<bool>, _>(index)
                .map(|v| v.map_or(Value::Null, Value::Boolean)),
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => row
                .try_get::<Option<String>, _>(index)
                .map(|v| v.map_or(Value::Null, Value::Text)),
            other => {
                return Err(ExecuteError(format!(
                    "cannot decode column {} of type {other}",
                    column.name()
                )))
            }
        };
        values.push(value.map_err(|e| ExecuteError(e.to_string()))?);
    }
    Ok(values)
}
