//! The model catalog.
//!
//! The catalog is the process-wide table of registered models, plus the
//! validator registry used to check bindings at registration time. It is
//! an explicit object handed by reference to every component that needs
//! it; there is no ambient global registry. A single read/write lock
//! serializes registrations, so concurrent `register` calls for the same
//! name resolve to last-writer-wins without readers observing a half-built
//! model.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::column::Column;
use crate::error::SchemaError;
use crate::kind::{Kind, OnDelete};
use crate::validate::ValidatorSet;

/// A registered model: a named, validated, ordered set of columns.
#[derive(Debug)]
pub struct Model {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<usize>,
}

impl Model {
    /// Returns the model name, as given at registration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declared order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the primary-key column, if one was declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Column> {
        self.primary_key.map(|i| &self.columns[i])
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Normalizes a model name for registry keying.
fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Registry of models and validators.
pub struct Catalog {
    models: RwLock<HashMap<String, Arc<Model>>>,
    validators: ValidatorSet,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates a catalog preloaded with the built-in validators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            validators: ValidatorSet::with_builtins(),
        }
    }

    /// Creates a catalog with no validators registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            validators: ValidatorSet::new(),
        }
    }

    /// Returns the validator registry.
    #[must_use]
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Registers a model under `name`, validating every column.
    ///
    /// Re-registering a name overwrites the prior entry; callers holding an
    /// `Arc` to the old model keep a stale but internally consistent
    /// snapshot. All checks here are registration-time configuration
    /// checks — catching them before any row is processed is the point of
    /// validating eagerly.
    ///
    /// # Errors
    ///
    /// See [`SchemaError`] for the individual contract violations.
    pub fn register(
        &self,
        name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<Arc<Model>, SchemaError> {
        let name = name.into();
        let mut primary_key = None;

        for (index, column) in columns.iter().enumerate() {
            if columns[..index].iter().any(|c| c.name == column.name) {
                return Err(SchemaError::DuplicateColumn {
                    model: name,
                    column: column.name.clone(),
                });
            }

            if column.primary_key {
                if primary_key.is_some() {
                    return Err(SchemaError::MultiplePrimaryKeys { model: name });
                }
                primary_key = Some(index);
            }

            if column.autoincrement && !matches!(column.kind, Kind::Integer) {
                return Err(SchemaError::AutoIncrementOnNonInteger {
                    column: column.name.clone(),
                });
            }

            if let Kind::Reference { target, on_delete } = &column.kind {
                let target_model = self.get(target).ok_or_else(|| {
                    SchemaError::TargetModelNotFound {
                        column: column.name.clone(),
                        target: target.clone(),
                    }
                })?;
                if target_model.primary_key().is_none() {
                    return Err(SchemaError::TargetHasNoPrimaryKey {
                        target: target_model.name().to_string(),
                    });
                }
                if *on_delete == OnDelete::SetNull && !column.nullable {
                    return Err(SchemaError::SetNullOnNonNullable {
                        column: column.name.clone(),
                    });
                }
            }

            for binding in &column.validators {
                self.validators.check_binding(column, binding)?;
            }
        }

        let model = Arc::new(Model {
            name: name.clone(),
            columns,
            primary_key,
        });
        let mut models = self.models.write().expect("catalog lock poisoned");
        models.insert(normalize(&name), Arc::clone(&model));
        debug!(
            model = model.name(),
            columns = model.columns().len(),
            "model registered"
        );
        Ok(model)
    }

    /// Looks up a model by case-normalized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        let models = self.models.read().expect("catalog lock poisoned");
        models.get(&normalize(name)).cloned()
    }

    /// Returns the canonical SQL type name for a kind.
    ///
    /// Reference kinds resolve to the type of the target model's
    /// primary-key column. `autoincrement` switches Integer to its serial
    /// spelling; it is ignored for other kinds.
    ///
    /// # Errors
    ///
    /// Fails when a reference target is missing from the catalog, has no
    /// primary key, or sits on a circular reference chain (all possible
    /// after a hot re-registration).
    pub fn sql_type(&self, kind: &Kind, autoincrement: bool) -> Result<String, SchemaError> {
        match kind {
            Kind::Integer => Ok(String::from(if autoincrement {
                "bigserial"
            } else {
                "bigint"
            })),
            Kind::Text { max_length: None } => Ok(String::from("text")),
            Kind::Text {
                max_length: Some(n),
            } => Ok(format!("varchar({n})")),
            Kind::Boolean => Ok(String::from("boolean")),
            Kind::Reference { target, .. } => {
                let pk_kind = self.resolve_reference(target, &mut Vec::new())?;
                self.sql_type(&pk_kind, false)
            }
        }
    }

    /// Resolves a kind to its non-reference equivalent.
    ///
    /// Reference kinds become the kind of the target's primary key; all
    /// other kinds pass through. Introspected schemas only ever see the
    /// physical side of a foreign key, so diffing compares effective kinds.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Catalog::sql_type`].
    pub fn effective_kind(&self, kind: &Kind) -> Result<Kind, SchemaError> {
        match kind {
            Kind::Reference { target, .. } => self.resolve_reference(target, &mut Vec::new()),
            other => Ok(other.clone()),
        }
    }

    /// Follows a reference chain to its terminal primary-key kind.
    ///
    /// `seen` holds the normalized names already visited; revisiting one
    /// means the chain loops, which re-registration can produce because
    /// registration validates against the previous snapshot of the target.
    fn resolve_reference(&self, target: &str, seen: &mut Vec<String>) -> Result<Kind, SchemaError> {
        let key = normalize(target);
        if seen.contains(&key) {
            return Err(SchemaError::CircularReference {
                target: target.to_string(),
            });
        }
        seen.push(key);
        let model = self
            .get(target)
            .ok_or_else(|| SchemaError::TargetModelNotFound {
                column: String::new(),
                target: target.to_string(),
            })?;
        let pk = model
            .primary_key()
            .ok_or_else(|| SchemaError::TargetHasNoPrimaryKey {
                target: model.name().to_string(),
            })?;
        match &pk.kind {
            Kind::Reference { target: next, .. } => self.resolve_reference(next, seen),
            other => Ok(other.clone()),
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let models = self.models.read().expect("catalog lock poisoned");
        f.debug_struct("Catalog")
            .field("models", &models.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn user_columns() -> Vec<Column> {
        vec![
            Column::new("ID", Kind::Integer).primary_key(),
            Column::new("Name", Kind::text()),
            Column::new("Email", Kind::varchar(255)).unique(),
        ]
    }

    #[test]
    fn register_and_lookup_is_case_normalized() {
        let catalog = Catalog::new();
        catalog.register("User", user_columns()).unwrap();
        assert!(catalog.get("user").is_some());
        assert_eq!(catalog.get("USER").unwrap().name(), "User");
    }

    #[test]
    fn reference_to_unregistered_model_fails() {
        let catalog = Catalog::new();
        let err = catalog
            .register(
                "Task",
                vec![Column::new(
                    "User",
                    Kind::reference("User", OnDelete::Cascade),
                )],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::TargetModelNotFound { .. }));
    }

    #[test]
    fn reference_to_keyless_model_fails() {
        let catalog = Catalog::new();
        catalog
            .register("Note", vec![Column::new("Body", Kind::text())])
            .unwrap();
        let err = catalog
            .register(
                "Pin",
                vec![Column::new(
                    "Note",
                    Kind::reference("Note", OnDelete::Cascade),
                )],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::TargetHasNoPrimaryKey { .. }));
    }

    #[test]
    fn set_null_requires_nullable() {
        let catalog = Catalog::new();
        catalog.register("User", user_columns()).unwrap();
        let err = catalog
            .register(
                "Task",
                vec![Column::new(
                    "User",
                    Kind::reference("User", OnDelete::SetNull),
                )],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::SetNullOnNonNullable { .. }));

        catalog
            .register(
                "Task",
                vec![Column::new("User", Kind::reference("User", OnDelete::SetNull)).nullable()],
            )
            .unwrap();
    }

    #[test]
    fn multiple_primary_keys_fail() {
        let catalog = Catalog::new();
        let err = catalog
            .register(
                "Pair",
                vec![
                    Column::new("A", Kind::Integer).primary_key(),
                    Column::new("B", Kind::Integer).primary_key(),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::MultiplePrimaryKeys { .. }));
    }

    #[test]
    fn text_validator_on_integer_column_fails_at_registration() {
        let catalog = Catalog::new();
        let err = catalog
            .register(
                "User",
                vec![Column::new("Age", Kind::Integer).validate("email")],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidatorKindMismatch { .. }));
    }

    #[test]
    fn validator_arity_checked_at_registration() {
        let catalog = Catalog::new();
        let err = catalog
            .register(
                "User",
                vec![Column::new("Name", Kind::text())
                    .validate_with("min_length", vec![Value::Integer(1), Value::Integer(2)])],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidatorArity { .. }));
    }

    #[test]
    fn reregistration_overwrites() {
        let catalog = Catalog::new();
        let old = catalog.register("User", user_columns()).unwrap();
        catalog
            .register("User", vec![Column::new("ID", Kind::Integer).primary_key()])
            .unwrap();
        assert_eq!(catalog.get("User").unwrap().columns().len(), 1);
        // The old handle still sees its own snapshot.
        assert_eq!(old.columns().len(), 3);
    }

    #[test]
    fn sql_type_resolves_references_to_target_pk() {
        let catalog = Catalog::new();
        catalog.register("User", user_columns()).unwrap();
        let kind = Kind::reference("User", OnDelete::Cascade);
        assert_eq!(catalog.sql_type(&kind, false).unwrap(), "bigint");
        assert_eq!(catalog.effective_kind(&kind).unwrap(), Kind::Integer);
    }

    #[test]
    fn circular_reference_chain_is_an_error() {
        let catalog = Catalog::new();
        catalog
            .register("A", vec![Column::new("ID", Kind::Integer).primary_key()])
            .unwrap();
        // Accepted: the reference check sees the previous snapshot of A,
        // whose primary key is still an integer.
        catalog
            .register(
                "A",
                vec![Column::new("ID", Kind::reference("A", OnDelete::Cascade)).primary_key()],
            )
            .unwrap();

        let kind = Kind::reference("A", OnDelete::Cascade);
        assert!(matches!(
            catalog.effective_kind(&kind),
            Err(SchemaError::CircularReference { .. })
        ));
        assert!(matches!(
            catalog.sql_type(&kind, false),
            Err(SchemaError::CircularReference { .. })
        ));
    }

    #[test]
    fn two_model_reference_loop_is_an_error() {
        let catalog = Catalog::new();
        catalog
            .register("A", vec![Column::new("ID", Kind::Integer).primary_key()])
            .unwrap();
        catalog
            .register(
                "B",
                vec![Column::new("ID", Kind::reference("A", OnDelete::Cascade)).primary_key()],
            )
            .unwrap();
        catalog
            .register(
                "A",
                vec![Column::new("ID", Kind::reference("B", OnDelete::Cascade)).primary_key()],
            )
            .unwrap();

        assert!(matches!(
            catalog.effective_kind(&Kind::reference("B", OnDelete::Cascade)),
            Err(SchemaError::CircularReference { .. })
        ));
    }

    #[test]
    fn autoincrement_renders_serial() {
        let catalog = Catalog::new();
        assert_eq!(catalog.sql_type(&Kind::Integer, true).unwrap(), "bigserial");
        assert_eq!(
            catalog.sql_type(&Kind::varchar(64), false).unwrap(),
            "varchar(64)"
        );
    }
}
