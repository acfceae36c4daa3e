//! Migration driving: introspect, diff, apply.

use tracing::{error, info};

use chisel_core::{Catalog, Executor};

use crate::ddl::{create_table_sql, drop_table_sql};
use crate::diff::diff;
use crate::error::{MigrateError, Result};
use crate::introspect::{current_columns, table_exists};
use crate::resolver::ChangeResolver;

/// Outcome of migrating one model.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Whether the table was created from scratch.
    pub created: bool,
    /// Statements that ran successfully.
    pub applied: Vec<String>,
    /// Statements that failed, with the database's explanation.
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    /// Returns whether every statement ran.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives migrations for registered models against one database.
#[derive(Debug)]
pub struct Migrator<'a, E> {
    catalog: &'a Catalog,
    executor: &'a E,
    schema: String,
}

impl<'a, E: Executor> Migrator<'a, E> {
    /// Creates a migrator targeting the `public` schema.
    pub fn new(catalog: &'a Catalog, executor: &'a E) -> Self {
        Self {
            catalog,
            executor,
            schema: String::from("public"),
        }
    }

    /// Overrides the target schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Creates the model's table unconditionally (IF NOT EXISTS).
    ///
    /// # Errors
    ///
    /// Unregistered model, DDL rendering failures, database failures.
    pub async fn create_table(&self, model_name: &str) -> Result<()> {
        let model = self
            .catalog
            .get(model_name)
            .ok_or_else(|| MigrateError::ModelNotRegistered {
                model: model_name.to_string(),
            })?;
        let sql = create_table_sql(self.catalog, model.name(), model.columns())?;
        self.executor.execute(&sql, &[]).await?;
        info!(table = model.name(), "table created");
        Ok(())
    }

    /// Drops the model's table. The catalog entry stays; registrations are
    /// metadata, independent of the table's existence.
    ///
    /// # Errors
    ///
    /// Unregistered model and database failures.
    pub async fn drop_table(&self, model_name: &str) -> Result<()> {
        let model = self
            .catalog
            .get(model_name)
            .ok_or_else(|| MigrateError::ModelNotRegistered {
                model: model_name.to_string(),
            })?;
        let sql = drop_table_sql(model.name());
        self.executor.execute(&sql, &[]).await?;
        info!(table = model.name(), "table dropped");
        Ok(())
    }

    /// Brings the model's table in line with its registration.
    ///
    /// An absent table is created outright. An existing table is diffed
    /// and the resulting statements run one at a time, best effort: a
    /// failed statement is logged and skipped so an independent change
    /// later in the batch still lands. Per-statement failures are
    /// reported, not returned as errors.
    ///
    /// # Errors
    ///
    /// Unregistered model, introspection failures, resolver failures, and
    /// failure of the CREATE TABLE itself.
    pub async fn migrate<R: ChangeResolver>(
        &self,
        model_name: &str,
        resolver: &mut R,
    ) -> Result<MigrationReport> {
        let model = self
            .catalog
            .get(model_name)
            .ok_or_else(|| MigrateError::ModelNotRegistered {
                model: model_name.to_string(),
            })?;
        let table = model.name();

        if !table_exists(self.executor, table, &self.schema).await? {
            let sql = create_table_sql(self.catalog, table, model.columns())?;
            self.executor.execute(&sql, &[]).await?;
            info!(table, "table created");
            return Ok(MigrationReport {
                created: true,
                applied: vec![sql],
                failed: Vec::new(),
            });
        }

        let current = current_columns(self.executor, table, &self.schema).await?;
        let diff = diff(self.catalog, table, &current, model.columns(), resolver)?;
        if diff.is_empty() {
            info!(table, "schema already up to date");
            return Ok(MigrationReport::default());
        }

        let mut report = MigrationReport::default();
        for statement in diff.statements(self.catalog, table)? {
            match self.executor.execute(&statement, &[]).await {
                Ok(_) => {
                    info!(table, statement = %statement, "migration statement applied");
                    report.applied.push(statement);
                }
                Err(err) => {
                    error!(table, statement = %statement, error = %err, "migration statement failed");
                    report.failed.push((statement, err.to_string()));
                }
            }
        }
        Ok(report)
    }
}
