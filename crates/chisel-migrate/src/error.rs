//! Error types for introspection, diffing and migration application.

use thiserror::Error;

use chisel_core::{ExecuteError, SchemaError};

/// Errors from the migration engine.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The model was never registered with the catalog.
    #[error("model {model} is not registered")]
    ModelNotRegistered {
        /// Requested model name.
        model: String,
    },

    /// Introspection was asked about a table that does not exist.
    ///
    /// Distinct from a table that exists with no recognizable columns.
    #[error("table {table} does not exist in schema {schema}")]
    TableNotFound {
        /// Requested table name.
        table: String,
        /// Schema searched.
        schema: String,
    },

    /// The system catalog reported a physical type the engine does not model.
    #[error("unknown database type {type_name} on column {column}")]
    UnknownDatabaseType {
        /// Physical type name from `pg_type`.
        type_name: String,
        /// Column carrying the type.
        column: String,
    },

    /// An introspection row did not have the expected shape.
    #[error("malformed system catalog row: {0}")]
    MalformedCatalogRow(String),

    /// A resolver-supplied backfill or fallback value is unusable.
    #[error("resolved value for column {column} is not usable: {reason}")]
    InvalidResolvedValue {
        /// Column the value was resolved for.
        column: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Schema-level failure while rendering DDL (for example a reference
    /// target dropped by a hot re-registration).
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The change resolver failed or declined.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Database failure, propagated verbatim.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Errors from a [`ChangeResolver`](crate::ChangeResolver).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A non-interactive resolver had no default for the column.
    #[error("no default value supplied for column {column}")]
    NoDefault {
        /// Column needing a value.
        column: String,
    },

    /// Reading the operator's answer failed.
    #[error("reading operator input failed: {0}")]
    Io(#[from] std::io::Error),

    /// The operator's answer did not parse as the required shape.
    #[error("input {input:?} is not a valid {expected} value")]
    Parse {
        /// The raw input.
        input: String,
        /// The shape that was required.
        expected: &'static str,
    },
}

/// Result alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
