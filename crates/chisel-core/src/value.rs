//! Runtime values exchanged with the database.
//!
//! Every cell that crosses the executor boundary is a [`Value`]. Bound query
//! arguments may additionally be a whole [`Record`](crate::Record) when the
//! caller filters on a foreign-key column; the query compiler replaces such
//! arguments with the referenced primary-key value before dispatch.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A single database value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// 64-bit integer. All integer column widths collapse to this.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// Text value.
    Text(String),
    /// A row of a registered model, used as a foreign-key query argument.
    Record(Box<Record>),
}

impl Value {
    /// Returns a short name for the value's shape, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Record(_) => "record",
        }
    }

    /// Returns whether the value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as an inline SQL literal.
    ///
    /// Used only for migration backfill statements, where the value comes
    /// from an operator-supplied default rather than user input. Text is
    /// escaped by doubling single quotes.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Integer(n) => n.to_string(),
            Self::Boolean(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Record(r) => format!("'{}'", r.model().replace('\'', "''")),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Record(r) => write!(f, "<{}>", r.model()),
        }
    }
}

/// Conversion into a [`Value`].
pub trait ToValue {
    /// Converts the value.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Integer(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl ToValue for i16 {
    fn to_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for Record {
    fn to_value(self) -> Value {
        Value::Record(Box::new(self))
    }
}

/// Absent options become NULL, present ones convert their payload.
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}
