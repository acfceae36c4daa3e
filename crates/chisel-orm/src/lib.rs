//! # chisel-orm
//!
//! Query compilation, row marshalling and the store for chisel models.
//! A [`Query`] describes a SELECT declaratively; [`compile`] checks it
//! against the catalog and renders dialect SQL with `$1`-style
//! parameters; the [`Store`] dispatches it and marshals the rows back
//! into [`Record`](chisel_core::Record)s, with reference columns
//! expanded into nested records one level deep.
//!
//! ```
//! use chisel_core::{Catalog, Column, Condition, Kind};
//! use chisel_orm::{compile, Query};
//!
//! let catalog = Catalog::new();
//! catalog
//!     .register(
//!         "User",
//!         vec![
//!             Column::new("ID", Kind::Integer).primary_key().autoincrement(),
//!             Column::new("Name", Kind::text()),
//!         ],
//!     )
//!     .unwrap();
//!
//! let query = Query::new("User").filter(Condition::equals("Name", "ada"));
//! let compiled = compile(&catalog, &query).unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT \"User\".\"ID\", \"User\".\"Name\" FROM \"User\" WHERE \"Name\" = $1;"
//! );
//! ```

mod compile;
mod error;
mod marshal;
mod query;
mod store;

pub use compile::{compile, compile_delete, compile_insert, CompiledQuery, CompiledStatement};
pub use error::{QueryError, Result};
pub use marshal::record_from_row;
pub use query::{Direction, Query};
pub use store::Store;
