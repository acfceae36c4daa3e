//! The execution collaborator contract.
//!
//! Everything above this trait is backend-agnostic: the migration engine
//! and the query pipeline only ever hand finished statement text plus
//! positional arguments to an [`Executor`]. The `chisel-pg` crate provides
//! the PostgreSQL implementation; tests use recording mocks.

use thiserror::Error;

use crate::value::Value;

/// An error from the underlying database, propagated verbatim.
#[derive(Debug, Error)]
#[error("database error: {0}")]
pub struct ExecuteError(pub String);

/// A result set: column names plus rows of decoded values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// Result column names, in projection order.
    pub columns: Vec<String>,
    /// Rows, each with one [`Value`] per column.
    pub rows: Vec<Vec<Value>>,
}

impl Rows {
    /// Creates a result set.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the result set holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Value>> {
        self.rows.iter()
    }
}

impl IntoIterator for Rows {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Dispatches finished statements to a database.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Runs a statement that returns no rows, yielding the affected count.
    async fn execute(&self, statement: &str, args: &[Value]) -> Result<u64, ExecuteError>;

    /// Runs a statement that returns rows.
    async fn query(&self, statement: &str, args: &[Value]) -> Result<Rows, ExecuteError>;
}
