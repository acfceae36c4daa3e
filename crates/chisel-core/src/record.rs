//! Records: model-tagged rows.
//!
//! A [`Record`] is the untyped but schema-aware shape that rows take on
//! their way in (inserts) and out (query results). Callers map between
//! records and their own structs through [`FromRecord`] and [`ToRecord`],
//! which replaces runtime reflection with an explicit, checkable contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

/// Errors raised by typed [`Record`] accessors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record has no value for the requested column.
    #[error("record for {model} has no value for column {column}")]
    Missing {
        /// Model name.
        model: String,
        /// Column name.
        column: String,
    },

    /// The stored value does not have the requested shape.
    #[error("column {column} holds a {actual} value, not {expected}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Requested shape.
        expected: &'static str,
        /// Stored shape.
        actual: &'static str,
    },
}

/// An ordered set of column values belonging to one model.
///
/// Value order follows insertion order, which for marshalled query results
/// is the projection order used at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    model: String,
    values: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record for the named model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            values: Vec::new(),
        }
    }

    /// Returns the model name this record belongs to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sets a column value, replacing any prior value for the same column.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl crate::value::ToValue) -> Self {
        self.push(column, value.to_value());
        self
    }

    /// Appends or replaces a column value in place.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if let Some(entry) = self.values.iter_mut().find(|(name, _)| *name == column) {
            entry.1 = value;
        } else {
            self.values.push((column, value));
        }
    }

    /// Returns the value for a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the column/value pairs in insertion order.
    #[must_use]
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the record holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, column: &str) -> Result<&Value, RecordError> {
        self.get(column).ok_or_else(|| RecordError::Missing {
            model: self.model.clone(),
            column: column.to_string(),
        })
    }

    /// Returns an integer column value.
    pub fn int(&self, column: &str) -> Result<i64, RecordError> {
        match self.require(column)? {
            Value::Integer(n) => Ok(*n),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Returns a text column value.
    pub fn text(&self, column: &str) -> Result<&str, RecordError> {
        match self.require(column)? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Returns a boolean column value.
    pub fn boolean(&self, column: &str) -> Result<bool, RecordError> {
        match self.require(column)? {
            Value::Boolean(b) => Ok(*b),
            other => Err(mismatch(column, "boolean", other)),
        }
    }

    /// Returns a nested record, as produced for joined reference columns.
    pub fn record(&self, column: &str) -> Result<&Record, RecordError> {
        match self.require(column)? {
            Value::Record(r) => Ok(r),
            other => Err(mismatch(column, "record", other)),
        }
    }

    /// Returns an integer column value, or `None` when the cell is NULL.
    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, RecordError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Integer(n) => Ok(Some(*n)),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Returns a text column value, or `None` when the cell is NULL.
    pub fn opt_text(&self, column: &str) -> Result<Option<&str>, RecordError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Returns a boolean column value, or `None` when the cell is NULL.
    pub fn opt_boolean(&self, column: &str) -> Result<Option<bool>, RecordError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Boolean(b) => Ok(Some(*b)),
            other => Err(mismatch(column, "boolean", other)),
        }
    }
}

fn mismatch(column: &str, expected: &'static str, actual: &Value) -> RecordError {
    RecordError::TypeMismatch {
        column: column.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

/// Builds a typed struct from a marshalled record.
pub trait FromRecord: Sized {
    /// Converts the record. Accessor errors surface as [`RecordError`].
    fn from_record(record: &Record) -> Result<Self, RecordError>;
}

/// Converts a typed struct into a record for insertion.
pub trait ToRecord {
    /// Builds the record. Column names must match the registered model.
    fn to_record(&self) -> Record;
}
