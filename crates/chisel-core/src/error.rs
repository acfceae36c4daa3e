//! Error types for schema registration and validation.

use thiserror::Error;

use crate::kind::KindClass;
use crate::value::Value;

/// Configuration errors raised while registering a model.
///
/// These represent contract violations in the schema description itself.
/// They are raised eagerly, before any row is processed, and are not
/// recoverable at runtime: the schema has to be fixed.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two columns in one model share a name.
    #[error("model {model} declares column {column} more than once")]
    DuplicateColumn {
        /// Model name.
        model: String,
        /// Duplicated column name.
        column: String,
    },

    /// More than one column claims to be the primary key.
    #[error("model {model} declares more than one primary key column")]
    MultiplePrimaryKeys {
        /// Model name.
        model: String,
    },

    /// A reference column points at a model that was never registered.
    #[error("column {column} references model {target}, which is not registered")]
    TargetModelNotFound {
        /// Referencing column.
        column: String,
        /// Missing target model.
        target: String,
    },

    /// A reference column points at a model with no primary key.
    #[error("cannot reference model {target}: it has no primary key")]
    TargetHasNoPrimaryKey {
        /// Target model.
        target: String,
    },

    /// A chain of reference primary keys loops back on itself.
    ///
    /// Possible through hot re-registration, which validates the new
    /// columns against the previous snapshot of the target.
    #[error("reference chain through model {target} is circular")]
    CircularReference {
        /// Model at which the loop was detected.
        target: String,
    },

    /// SET NULL delete policy on a column that forbids NULL.
    #[error("column {column} is not nullable, so its on-delete policy cannot be SET NULL")]
    SetNullOnNonNullable {
        /// Offending column.
        column: String,
    },

    /// Autoincrement requested on a non-integer column.
    #[error("column {column} cannot autoincrement: only integer columns can")]
    AutoIncrementOnNonInteger {
        /// Offending column.
        column: String,
    },

    /// A bound validator was never registered.
    #[error("validator {validator} on column {column} is not registered")]
    UnknownValidator {
        /// Column carrying the binding.
        column: String,
        /// Unregistered validator name.
        validator: String,
    },

    /// A bound validator handles a different kind than the column's.
    #[error("validator {validator} handles {expects} columns, but {column} is {found}")]
    ValidatorKindMismatch {
        /// Validator name.
        validator: String,
        /// Kind class the validator accepts.
        expects: KindClass,
        /// Column carrying the binding.
        column: String,
        /// The column's kind class.
        found: KindClass,
    },

    /// A bound validator received the wrong number of arguments.
    #[error("validator {validator} takes {expects} arguments, {given} given")]
    ValidatorArity {
        /// Validator name.
        validator: String,
        /// Declared parameter count.
        expects: usize,
        /// Arguments supplied in the binding.
        given: usize,
    },
}

/// A validator rejected a value during a pre-insert run.
///
/// The run is fail-fast: the first rejection stops validation and is
/// surfaced as-is.
#[derive(Debug, Error)]
#[error("validator {validator} rejected column {column} value {value}: {message}")]
pub struct ValidationError {
    /// Validator that rejected the value.
    pub validator: String,
    /// Column the value belongs to.
    pub column: String,
    /// The offending value.
    pub value: Value,
    /// The validator's own failure message.
    pub message: String,
}
