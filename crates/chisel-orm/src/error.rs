//! Error types for query compilation, marshalling and the store.

use thiserror::Error;

use chisel_core::{ExecuteError, RecordError, ValidationError};

/// Errors from the query pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The queried model was never registered with the catalog.
    #[error("model {model} is not registered")]
    ModelNotRegistered {
        /// Requested model name.
        model: String,
    },

    /// A selected, filtered or ordered column does not exist on the model.
    #[error("model {model} has no column {column}")]
    UnknownColumn {
        /// Model name.
        model: String,
        /// Offending column name.
        column: String,
    },

    /// A join or record argument needed a primary key the model lacks.
    #[error("model {model} has no primary key value")]
    MissingPrimaryKey {
        /// Model name.
        model: String,
    },

    /// An insert record is missing a required column value.
    #[error("record for {model} is missing required column {column}")]
    MissingColumn {
        /// Model name.
        model: String,
        /// Required column.
        column: String,
    },

    /// An order direction was given without an order column.
    #[error("order direction given without an order column")]
    OrderWithoutColumn,

    /// Placeholder markers and bound arguments do not line up.
    #[error("query binds {arguments} arguments but has {placeholders} placeholders")]
    PlaceholderMismatch {
        /// Markers counted in the statement.
        placeholders: usize,
        /// Arguments supplied.
        arguments: usize,
    },

    /// A scanned cell does not fit the column it maps to.
    #[error("column {column} expects {expected} values, row holds {actual}")]
    TypeMismatch {
        /// Column being marshalled.
        column: String,
        /// Kind class the column declares.
        expected: String,
        /// Shape the row actually held.
        actual: &'static str,
    },

    /// A scanned row does not have one cell per projected column.
    #[error("row holds {actual} cells, projection expects {expected}")]
    RowWidth {
        /// Cells the projection accounts for.
        expected: usize,
        /// Cells in the row.
        actual: usize,
    },

    /// A typed accessor failed while mapping a record to a struct.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A pre-insert validator rejected the record.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database failure, propagated verbatim.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Result alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
