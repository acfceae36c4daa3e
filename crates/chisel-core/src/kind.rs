//! Logical column kinds and their PostgreSQL type mappings.
//!
//! The mapping is a near-inverse pair: [`Kind::from_sql`] folds the
//! database's many physical names (`int4`, `int8`, `serial`, ...) onto one
//! logical kind, and the catalog renders each kind back to a single
//! canonical type name. `text` and `varchar` both alias [`Kind::Text`].

use serde::{Deserialize, Serialize};

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OnDelete {
    /// Delete referencing rows as well.
    Cascade,
    /// Set the referencing column to NULL. Only valid on nullable columns.
    SetNull,
    /// Refuse the delete while references exist.
    Restrict,
    /// No action (deferred check).
    #[default]
    NoAction,
}

impl OnDelete {
    /// Returns the SQL spelling of the policy.
    #[must_use]
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }

    /// Parses the SQL spelling of the policy.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "RESTRICT" => Some(Self::Restrict),
            "NO ACTION" => Some(Self::NoAction),
            _ => None,
        }
    }
}

/// The logical kind of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// 64-bit integer.
    Integer,
    /// Text, optionally with a declared maximum length (rendered varchar).
    Text {
        /// Maximum length; `None` renders as unbounded `text`.
        max_length: Option<u32>,
    },
    /// Boolean.
    Boolean,
    /// Foreign key to another registered model's primary key.
    Reference {
        /// Target model name, as passed to `Catalog::register`.
        target: String,
        /// Delete policy for the constraint.
        on_delete: OnDelete,
    },
}

/// Kind classes, used to match validators against columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    /// Integer columns.
    Integer,
    /// Text columns of any length.
    Text,
    /// Boolean columns.
    Boolean,
    /// Reference columns.
    Reference,
}

impl std::fmt::Display for KindClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::Boolean => write!(f, "boolean"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

impl Kind {
    /// Shorthand for an unbounded text kind.
    #[must_use]
    pub fn text() -> Self {
        Self::Text { max_length: None }
    }

    /// Shorthand for a length-limited text kind.
    #[must_use]
    pub fn varchar(max_length: u32) -> Self {
        Self::Text {
            max_length: Some(max_length),
        }
    }

    /// Shorthand for a reference kind.
    #[must_use]
    pub fn reference(target: impl Into<String>, on_delete: OnDelete) -> Self {
        Self::Reference {
            target: target.into(),
            on_delete,
        }
    }

    /// Returns the kind's class.
    #[must_use]
    pub fn class(&self) -> KindClass {
        match self {
            Self::Integer => KindClass::Integer,
            Self::Text { .. } => KindClass::Text,
            Self::Boolean => KindClass::Boolean,
            Self::Reference { .. } => KindClass::Reference,
        }
    }

    /// Maps a physical type name from the system catalog to a logical kind.
    ///
    /// `max_length` is the declared varchar length, when the catalog reports
    /// one. Returns `None` for physical types the engine does not model;
    /// introspection turns that into an unknown-database-type error rather
    /// than guessing.
    #[must_use]
    pub fn from_sql(type_name: &str, max_length: Option<u32>) -> Option<Self> {
        match type_name {
            "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" | "serial"
            | "bigserial" | "smallserial" => Some(Self::Integer),
            "text" => Some(Self::text()),
            "varchar" | "character varying" => Some(Self::Text { max_length }),
            "bool" | "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text { max_length: None } => write!(f, "text"),
            Self::Text {
                max_length: Some(n),
            } => write!(f, "varchar({n})"),
            Self::Boolean => write!(f, "boolean"),
            Self::Reference { target, .. } => write!(f, "reference to {target}"),
        }
    }
}
