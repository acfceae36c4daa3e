//! # chisel-migrate
//!
//! Schema introspection and migration for chisel models. Given a
//! registered model and a live PostgreSQL database, the migrator creates
//! the table when it is absent and otherwise diffs the live columns
//! against the registration, rendering and applying the ALTER statements
//! that close the gap.
//!
//! Changes that need a data decision — backfilling a column that becomes
//! NOT NULL, picking a fallback for a lossy type conversion — are routed
//! through a [`ChangeResolver`]: interactive deployments use
//! [`PromptResolver`], batch ones [`MapResolver`].

mod apply;
mod ddl;
mod diff;
mod error;
mod introspect;
mod resolver;

pub use apply::{MigrationReport, Migrator};
pub use ddl::{add_column_sql, create_table_sql, drop_column_sql, drop_table_sql};
pub use diff::{diff, MigrationDiff};
pub use error::{MigrateError, ResolveError, Result};
pub use introspect::{current_columns, table_exists, COLUMNS_SQL, TABLE_EXISTS_SQL};
pub use resolver::{AmbiguousChange, ChangeResolver, MapResolver, PromptResolver};
