//! Resolution strategies for lossy or ambiguous schema changes.
//!
//! Two diff rules cannot be decided from the schemas alone: tightening a
//! column to NOT NULL needs a backfill value for existing NULLs, and
//! changing a column's type to integer needs a fallback for rows that do
//! not parse. The differ asks an injected [`ChangeResolver`] instead of
//! blocking on standard input, so batch deployments can supply defaults
//! programmatically and the differ stays unit-testable.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use chisel_core::{Kind, Value};

use crate::error::ResolveError;

/// A change the schemas alone cannot decide.
#[derive(Debug, Clone, Copy)]
pub enum AmbiguousChange<'a> {
    /// The column is being tightened to NOT NULL; existing NULL rows need
    /// a backfill value of the column's kind.
    NotNullBackfill {
        /// The column's kind.
        kind: &'a Kind,
    },
    /// The column's type is changing; rows that cannot be converted need
    /// an integer fallback.
    TypeChangeFallback {
        /// Current kind, per introspection.
        from: &'a Kind,
        /// Desired kind, per registration.
        to: &'a Kind,
    },
}

/// Supplies values for ambiguous changes.
pub trait ChangeResolver {
    /// Resolves a value for the named column.
    ///
    /// # Errors
    ///
    /// Resolver-specific; a failure aborts the diff (not the batch).
    fn resolve(&mut self, column: &str, change: AmbiguousChange<'_>)
        -> Result<Value, ResolveError>;
}

/// Interactive resolver that prompts the operator on standard input.
///
/// Blocks the calling thread while waiting for an answer. Deployments that
/// cannot block should use [`MapResolver`].
#[derive(Debug, Default)]
pub struct PromptResolver;

impl PromptResolver {
    /// Creates a prompt resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn ask(prompt: &str) -> Result<String, ResolveError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn parse(input: String, kind: &Kind) -> Result<Value, ResolveError> {
        match kind {
            Kind::Integer | Kind::Reference { .. } => input
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| ResolveError::Parse {
                    input,
                    expected: "integer",
                }),
            Kind::Boolean => input
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|_| ResolveError::Parse {
                    input,
                    expected: "boolean",
                }),
            Kind::Text { .. } => Ok(Value::Text(input)),
        }
    }
}

impl ChangeResolver for PromptResolver {
    fn resolve(
        &mut self,
        column: &str,
        change: AmbiguousChange<'_>,
    ) -> Result<Value, ResolveError> {
        match change {
            AmbiguousChange::NotNullBackfill { kind } => {
                let input = Self::ask(&format!(
                    "Migrator: {column} is becoming NOT NULL. Backfill value for existing NULL rows: "
                ))?;
                Self::parse(input, kind)
            }
            AmbiguousChange::TypeChangeFallback { from, to } => {
                let input = Self::ask(&format!(
                    "Migrator: {column} is changing type from {from} to {to}. Default value for unconvertible rows: "
                ))?;
                Self::parse(input, &Kind::Integer)
            }
        }
    }
}

/// Non-interactive resolver backed by per-column defaults.
#[derive(Debug, Default)]
pub struct MapResolver {
    defaults: HashMap<String, Value>,
}

impl MapResolver {
    /// Creates an empty resolver. Every resolution fails until defaults
    /// are supplied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies a default value for a column.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(column.into(), value);
        self
    }
}

impl ChangeResolver for MapResolver {
    fn resolve(
        &mut self,
        column: &str,
        _change: AmbiguousChange<'_>,
    ) -> Result<Value, ResolveError> {
        self.defaults
            .get(column)
            .cloned()
            .ok_or_else(|| ResolveError::NoDefault {
                column: column.to_string(),
            })
    }
}
