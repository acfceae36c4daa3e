//! Three-way schema comparison.
//!
//! The differ lines the introspected columns up against the registered
//! model by case-normalized name and produces additions, per-column
//! alterations, and deletions. Alterations are rendered eagerly as full
//! statements because some of them need operator input (backfill values,
//! conversion fallbacks) that must be gathered while both schemas are in
//! hand; additions and deletions stay as column descriptors until
//! [`MigrationDiff::statements`] renders them.

use std::collections::HashMap;

use tracing::{debug, error};

use chisel_core::{Catalog, Column, Kind, Value};

use crate::ddl::{add_column_sql, drop_column_sql};
use crate::error::{MigrateError, Result};
use crate::resolver::{AmbiguousChange, ChangeResolver};

/// The difference between a live table and its registered model.
#[derive(Debug, Default)]
pub struct MigrationDiff {
    /// Columns in the model but not the table, in declared order.
    pub additions: Vec<Column>,
    /// Rendered ALTER/UPDATE statements for columns present in both.
    pub alterations: Vec<String>,
    /// Columns in the table but not the model, in physical order.
    pub deletions: Vec<Column>,
}

impl MigrationDiff {
    /// Returns whether the table already matches the model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.alterations.is_empty() && self.deletions.is_empty()
    }

    /// Renders the diff as executable statements: deletions first so a
    /// dropped-and-readded column never collides with itself, then
    /// alterations, then additions.
    ///
    /// # Errors
    ///
    /// Fails when an added reference column's target is missing from the
    /// catalog or has no primary key.
    pub fn statements(&self, catalog: &Catalog, table: &str) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(
            self.deletions.len() + self.alterations.len() + self.additions.len(),
        );
        for column in &self.deletions {
            out.push(drop_column_sql(table, &column.name));
        }
        out.extend(self.alterations.iter().cloned());
        for column in &self.additions {
            out.push(add_column_sql(catalog, table, column)?);
        }
        Ok(out)
    }
}

/// Compares the live columns of `table` against the registered model
/// columns and produces a [`MigrationDiff`].
///
/// Columns match by case-normalized name. Reference kinds on the model
/// side are compared through their target primary-key type, since
/// introspection only ever sees the physical side of a foreign key.
///
/// # Errors
///
/// Resolver failures and catalog lookup failures abort the diff. A
/// resolver answer of the wrong shape is `InvalidResolvedValue`.
pub fn diff<R: ChangeResolver>(
    catalog: &Catalog,
    table: &str,
    current: &[Column],
    desired: &[Column],
    resolver: &mut R,
) -> Result<MigrationDiff> {
    let desired_by_name: HashMap<String, &Column> = desired
        .iter()
        .map(|c| (c.name.to_lowercase(), c))
        .collect();
    let current_by_name: HashMap<String, &Column> = current
        .iter()
        .map(|c| (c.name.to_lowercase(), c))
        .collect();

    let mut diff = MigrationDiff::default();

    for old in current {
        match desired_by_name.get(&old.name.to_lowercase()) {
            Some(new) => {
                alter_column(catalog, table, old, new, resolver, &mut diff.alterations)?;
            }
            None => diff.deletions.push(old.clone()),
        }
    }

    for new in desired {
        if !current_by_name.contains_key(&new.name.to_lowercase()) {
            diff.additions.push(new.clone());
        }
    }

    debug!(
        table,
        additions = diff.additions.len(),
        alterations = diff.alterations.len(),
        deletions = diff.deletions.len(),
        "schema compared"
    );
    Ok(diff)
}

/// Emits the alteration statements for one column present on both sides.
///
/// Checks run in a fixed order: nullability, primary key, type,
/// uniqueness. Statements use the physical column name, since that is the
/// identifier the live table actually carries.
fn alter_column<R: ChangeResolver>(
    catalog: &Catalog,
    table: &str,
    old: &Column,
    new: &Column,
    resolver: &mut R,
    statements: &mut Vec<String>,
) -> Result<()> {
    let name = &old.name;

    if old.nullable && !new.nullable {
        let backfill = resolver.resolve(
            &new.name,
            AmbiguousChange::NotNullBackfill { kind: &new.kind },
        )?;
        check_backfill(catalog, new, &backfill)?;
        statements.push(format!(
            "UPDATE \"{table}\" SET \"{name}\" = {} WHERE \"{name}\" IS NULL;",
            backfill.to_sql_inline()
        ));
        statements.push(format!(
            "ALTER TABLE \"{table}\" ALTER COLUMN \"{name}\" SET NOT NULL;"
        ));
    } else if !old.nullable && new.nullable {
        statements.push(format!(
            "ALTER TABLE \"{table}\" ALTER COLUMN \"{name}\" DROP NOT NULL;"
        ));
    }

    if !old.primary_key && new.primary_key {
        statements.push(format!(
            "ALTER TABLE \"{table}\" ADD PRIMARY KEY (\"{name}\");"
        ));
    } else if old.primary_key && !new.primary_key {
        statements.push(format!(
            "ALTER TABLE \"{table}\" DROP CONSTRAINT \"{table}_pkey\";"
        ));
    }

    let new_kind = catalog.effective_kind(&new.kind)?;
    if old.kind != new_kind {
        let sql_type = catalog.sql_type(&new.kind, false)?;
        if matches!(new_kind, Kind::Integer) {
            // Narrowing to integer is lossy; unconvertible rows get the
            // operator-supplied fallback.
            let fallback = resolver.resolve(
                &new.name,
                AmbiguousChange::TypeChangeFallback {
                    from: &old.kind,
                    to: &new.kind,
                },
            )?;
            let Value::Integer(n) = fallback else {
                return Err(MigrateError::InvalidResolvedValue {
                    column: new.name.clone(),
                    reason: format!(
                        "integer fallback required, got {}",
                        fallback.kind_name()
                    ),
                });
            };
            statements.push(format!(
                "ALTER TABLE \"{table}\" ALTER COLUMN \"{name}\" TYPE {sql_type} \
                 USING CASE WHEN \"{name}\"::text ~ '^[0-9]+$' THEN \"{name}\"::text::{sql_type} ELSE {n} END;"
            ));
        } else {
            statements.push(format!(
                "ALTER TABLE \"{table}\" ALTER COLUMN \"{name}\" TYPE {sql_type};"
            ));
        }
    }

    if !old.unique && new.unique {
        if new.nullable {
            // Duplicate rows would make ADD UNIQUE fail outright, so all
            // but the first row of each group are NULLed beforehand.
            statements.push(format!(
                "UPDATE \"{table}\" SET \"{name}\" = NULL WHERE ctid IN (\
                 SELECT ctid FROM (\
                 SELECT ctid, ROW_NUMBER() OVER (PARTITION BY \"{name}\" ORDER BY ctid) AS rn \
                 FROM \"{table}\") dup WHERE dup.rn > 1);"
            ));
            statements.push(format!(
                "ALTER TABLE \"{table}\" ADD UNIQUE (\"{name}\");"
            ));
        } else {
            error!(
                table,
                column = %new.name,
                "cannot add a unique constraint to a NOT NULL column: \
                 existing duplicates have nowhere to go; skipping"
            );
        }
    } else if old.unique && !new.unique {
        statements.push(format!(
            "ALTER TABLE \"{table}\" DROP CONSTRAINT \"{table}_{name}_key\";"
        ));
    }

    Ok(())
}

/// Rejects backfill values that do not fit the column.
fn check_backfill(catalog: &Catalog, column: &Column, value: &Value) -> Result<()> {
    if value.is_null() {
        return Err(MigrateError::InvalidResolvedValue {
            column: column.name.clone(),
            reason: String::from("NULL cannot backfill a NOT NULL column"),
        });
    }
    let kind = catalog.effective_kind(&column.kind)?;
    let fits = matches!(
        (&kind, value),
        (Kind::Integer, Value::Integer(_))
            | (Kind::Boolean, Value::Boolean(_))
            | (Kind::Text { .. }, Value::Text(_))
    );
    if fits {
        Ok(())
    } else {
        Err(MigrateError::InvalidResolvedValue {
            column: column.name.clone(),
            reason: format!(
                "column holds {} values, got {}",
                kind.class(),
                value.kind_name()
            ),
        })
    }
}
