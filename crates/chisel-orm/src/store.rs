//! The store: compiled statements dispatched through an executor.

use tracing::debug;

use chisel_core::{run_validators, Catalog, Condition, Executor, FromRecord, Record};

use crate::compile::{compile, compile_delete, compile_insert};
use crate::error::{QueryError, Result};
use crate::marshal::record_from_row;
use crate::query::Query;

/// Runs queries and inserts for registered models against one database.
#[derive(Debug)]
pub struct Store<'a, E> {
    catalog: &'a Catalog,
    executor: &'a E,
}

impl<'a, E: Executor> Store<'a, E> {
    /// Creates a store over a catalog and an executor.
    pub fn new(catalog: &'a Catalog, executor: &'a E) -> Self {
        Self { catalog, executor }
    }

    /// Validates and inserts a record, returning the affected row count.
    ///
    /// Every validator bound to the record's model runs first; a
    /// rejection means nothing reaches the database.
    ///
    /// # Errors
    ///
    /// Validation rejections, compilation failures, database failures.
    pub async fn insert(&self, record: &Record) -> Result<u64> {
        let model = self.catalog.get(record.model()).ok_or_else(|| {
            QueryError::ModelNotRegistered {
                model: record.model().to_string(),
            }
        })?;
        run_validators(&model, record, self.catalog.validators())?;
        let statement = compile_insert(self.catalog, record)?;
        Ok(self
            .executor
            .execute(&statement.sql, &statement.args)
            .await?)
    }

    /// Runs a query and marshals every row into a [`Record`].
    ///
    /// # Errors
    ///
    /// Compilation failures, database failures, and rows that do not fit
    /// the compiled projection.
    pub async fn select(&self, query: &Query) -> Result<Vec<Record>> {
        let compiled = compile(self.catalog, query)?;
        let rows = self.executor.query(&compiled.sql, &compiled.args).await?;
        debug!(model = query.model(), rows = rows.len(), "query returned");
        rows.iter()
            .map(|row| record_from_row(self.catalog, query.model(), &compiled.projection, row))
            .collect()
    }

    /// Runs a query and maps every row into a caller type.
    ///
    /// # Errors
    ///
    /// Everything [`Store::select`] raises, plus accessor failures from
    /// the type's [`FromRecord`] implementation.
    pub async fn select_as<T: FromRecord>(&self, query: &Query) -> Result<Vec<T>> {
        self.select(query)
            .await?
            .iter()
            .map(|record| T::from_record(record).map_err(QueryError::from))
            .collect()
    }

    /// Deletes rows matching the conditions, returning the affected count.
    /// With no conditions every row of the model's table goes.
    ///
    /// # Errors
    ///
    /// Compilation failures and database failures.
    pub async fn delete(&self, model: &str, conditions: &[Condition]) -> Result<u64> {
        let statement = compile_delete(self.catalog, model, conditions)?;
        Ok(self
            .executor
            .execute(&statement.sql, &statement.args)
            .await?)
    }
}
