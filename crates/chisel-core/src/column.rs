//! Column descriptors.
//!
//! Callers describe each model as an ordered list of [`Column`]s and hand
//! the list to `Catalog::register`, which validates it. Declared order is
//! significant: it fixes the column layout in generated DDL and the cell
//! order when rows are scanned back.

use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::value::Value;

/// A validator bound to a column, with its declaration-time arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorBinding {
    /// Name the validator was registered under.
    pub name: String,
    /// Extra arguments passed to every invocation.
    pub args: Vec<Value>,
}

impl ValidatorBinding {
    /// Creates a binding without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Creates a binding with arguments.
    #[must_use]
    pub fn with_args(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Descriptor for one column of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within the model.
    pub name: String,
    /// Logical kind.
    pub kind: Kind,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Whether this column is the model's primary key.
    pub primary_key: bool,
    /// Whether the column carries a UNIQUE constraint.
    pub unique: bool,
    /// Whether the column auto-increments (Integer columns only).
    pub autoincrement: bool,
    /// Validators run against the column's value before insertion.
    pub validators: Vec<ValidatorBinding>,
}

impl Column {
    /// Creates a new column descriptor. Columns default to NOT NULL.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            primary_key: false,
            unique: false,
            autoincrement: false,
            validators: Vec::new(),
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as the primary key. Primary keys are NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Binds a validator without arguments.
    #[must_use]
    pub fn validate(mut self, validator: impl Into<String>) -> Self {
        self.validators.push(ValidatorBinding::new(validator));
        self
    }

    /// Binds a validator with arguments.
    #[must_use]
    pub fn validate_with(mut self, validator: impl Into<String>, args: Vec<Value>) -> Self {
        self.validators
            .push(ValidatorBinding::with_args(validator, args));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_is_not_nullable() {
        let column = Column::new("ID", Kind::Integer).nullable().primary_key();
        assert!(column.primary_key);
        assert!(!column.nullable);
    }

    #[test]
    fn builder_accumulates_validators() {
        let column = Column::new("Email", Kind::text())
            .validate("email")
            .validate_with("min_length", vec![Value::Integer(3)]);
        assert_eq!(column.validators.len(), 2);
        assert_eq!(column.validators[0].name, "email");
        assert_eq!(column.validators[1].args, vec![Value::Integer(3)]);
    }
}
