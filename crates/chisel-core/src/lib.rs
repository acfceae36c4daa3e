//! # chisel-core
//!
//! Schema catalog and shared building blocks for the chisel mapping
//! engine: logical column kinds, column descriptors, the model registry,
//! condition fragments, the validator registry, and the executor contract
//! that the migration and query crates speak to the database through.
//!
//! ## Describing a model
//!
//! ```
//! use chisel_core::{Catalog, Column, Kind, OnDelete};
//!
//! let catalog = Catalog::new();
//! catalog
//!     .register(
//!         "User",
//!         vec![
//!             Column::new("ID", Kind::Integer).primary_key().autoincrement(),
//!             Column::new("Name", Kind::text()),
//!             Column::new("Email", Kind::varchar(255)).unique().validate("email"),
//!         ],
//!     )
//!     .unwrap();
//! catalog
//!     .register(
//!         "Task",
//!         vec![
//!             Column::new("User", Kind::reference("User", OnDelete::Cascade)),
//!             Column::new("Title", Kind::text()),
//!         ],
//!     )
//!     .unwrap();
//! ```
//!
//! Registration validates everything up front: reference targets must
//! already be registered and keyed, SET NULL needs a nullable column, and
//! every bound validator must exist and accept the column's kind. Catching
//! these before any row is processed is the point of the catalog.

mod catalog;
mod column;
mod condition;
mod error;
mod executor;
mod kind;
mod record;
mod validate;
mod value;

pub use catalog::{Catalog, Model};
pub use column::{Column, ValidatorBinding};
pub use condition::{Condition, PLACEHOLDER};
pub use error::{SchemaError, ValidationError};
pub use executor::{ExecuteError, Executor, Rows};
pub use kind::{Kind, KindClass, OnDelete};
pub use record::{FromRecord, Record, RecordError, ToRecord};
pub use validate::{run_validators, Validator, ValidatorFn, ValidatorSet};
pub use value::{ToValue, Value};
