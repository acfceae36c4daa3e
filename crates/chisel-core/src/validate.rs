//! Validator registry and pre-insert validation runs.
//!
//! Validators are checked twice: structurally at registration time (does
//! the validator exist, does it accept the column's kind, does the binding
//! pass the right number of arguments) and behaviorally before each insert.
//! Runs are fail-fast: the first rejection wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex::Regex;

use crate::catalog::Model;
use crate::column::{Column, ValidatorBinding};
use crate::error::{SchemaError, ValidationError};
use crate::kind::KindClass;
use crate::record::Record;
use crate::value::Value;

/// Validator implementation: the column value plus the binding's declared
/// arguments, returning a human-readable rejection message on failure.
pub type ValidatorFn = Arc<dyn Fn(&Value, &[Value]) -> Result<(), String> + Send + Sync>;

/// A registered validator.
#[derive(Clone)]
pub struct Validator {
    class: KindClass,
    arity: usize,
    func: ValidatorFn,
}

impl Validator {
    /// Creates a validator for columns of the given kind class.
    pub fn new(
        class: KindClass,
        arity: usize,
        func: impl Fn(&Value, &[Value]) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            class,
            arity,
            func: Arc::new(func),
        }
    }

    /// Returns the kind class this validator accepts.
    #[must_use]
    pub fn class(&self) -> KindClass {
        self.class
    }

    /// Returns the declared extra-argument count.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("class", &self.class)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Named validator registry.
#[derive(Debug, Default)]
pub struct ValidatorSet {
    inner: RwLock<HashMap<String, Validator>>,
}

impl ValidatorSet {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the built-in validators.
    #[must_use]
    pub fn with_builtins() -> Self {
        let set = Self::new();
        set.register("email", email_validator());
        set.register("password", password_validator());
        set.register("min_length", min_length_validator());
        set.register("max_length", max_length_validator());
        set.register("in_range", in_range_validator());
        set
    }

    /// Registers a validator, replacing any prior one under the same name.
    pub fn register(&self, name: impl Into<String>, validator: Validator) {
        let mut inner = self.inner.write().expect("validator lock poisoned");
        inner.insert(name.into(), validator);
    }

    /// Looks up a validator by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Validator> {
        let inner = self.inner.read().expect("validator lock poisoned");
        inner.get(name).cloned()
    }

    /// Checks a column's validator binding at registration time.
    ///
    /// # Errors
    ///
    /// `UnknownValidator`, `ValidatorKindMismatch` or `ValidatorArity`.
    pub fn check_binding(
        &self,
        column: &Column,
        binding: &ValidatorBinding,
    ) -> Result<(), SchemaError> {
        let validator = self
            .get(&binding.name)
            .ok_or_else(|| SchemaError::UnknownValidator {
                column: column.name.clone(),
                validator: binding.name.clone(),
            })?;
        if validator.class() != column.kind.class() {
            return Err(SchemaError::ValidatorKindMismatch {
                validator: binding.name.clone(),
                expects: validator.class(),
                column: column.name.clone(),
                found: column.kind.class(),
            });
        }
        if binding.args.len() != validator.arity() {
            return Err(SchemaError::ValidatorArity {
                validator: binding.name.clone(),
                expects: validator.arity(),
                given: binding.args.len(),
            });
        }
        Ok(())
    }
}

/// Runs every validator bound to the model's columns against a record.
///
/// Columns are visited in declared order, bindings in declaration order.
/// NULL (or absent) values on nullable columns are skipped — nullability
/// is the column's own contract, not the validator's.
///
/// # Errors
///
/// The first rejection, carrying validator name, column, value and the
/// validator's message.
pub fn run_validators(
    model: &Model,
    record: &Record,
    set: &ValidatorSet,
) -> Result<(), ValidationError> {
    for column in model.columns() {
        if column.validators.is_empty() {
            continue;
        }
        let value = record.get(&column.name).cloned().unwrap_or(Value::Null);
        if value.is_null() && column.nullable {
            continue;
        }
        for binding in &column.validators {
            // Bindings were checked at registration; a vanished validator
            // here means the set was mutated since, which we treat as a
            // rejection rather than a panic.
            let Some(validator) = set.get(&binding.name) else {
                return Err(ValidationError {
                    validator: binding.name.clone(),
                    column: column.name.clone(),
                    value,
                    message: String::from("validator is no longer registered"),
                });
            };
            if let Err(message) = (validator.func)(&value, &binding.args) {
                return Err(ValidationError {
                    validator: binding.name.clone(),
                    column: column.name.clone(),
                    value,
                    message,
                });
            }
        }
    }
    Ok(())
}

fn expect_text(value: &Value) -> Result<&str, String> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(format!("expected a text value, got {}", other.kind_name())),
    }
}

fn expect_int_arg(args: &[Value], index: usize) -> Result<i64, String> {
    match args.get(index) {
        Some(Value::Integer(n)) => Ok(*n),
        _ => Err(format!("argument {index} must be an integer")),
    }
}

fn email_validator() -> Validator {
    Validator::new(KindClass::Text, 0, |value, _| {
        let email = expect_text(value)?;
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(String::from("there must be exactly one @"));
        };
        if local.is_empty() {
            return Err(String::from("missing local part before @"));
        }
        if domain.split('.').count() < 2 || domain.split('.').any(str::is_empty) {
            return Err(String::from("domain must contain a dot"));
        }
        Ok(())
    })
}

fn password_validator() -> Validator {
    let has_number = Regex::new(r"\d").expect("static regex");
    let has_capital = Regex::new(r"[A-Z]").expect("static regex");
    let has_special = Regex::new(r"[!@#$%^&*()]").expect("static regex");
    Validator::new(KindClass::Text, 0, move |value, _| {
        let password = expect_text(value)?;
        if password.len() < 12 {
            return Err(String::from("password must be 12 or more characters"));
        }
        if password.len() > 255 {
            return Err(String::from("password must not be greater than 255 characters"));
        }
        if !has_number.is_match(password) {
            return Err(String::from("password must have at least one number"));
        }
        if !has_capital.is_match(password) {
            return Err(String::from("password must have at least one capital letter"));
        }
        if !has_special.is_match(password) {
            return Err(String::from(
                "password must have at least one special character",
            ));
        }
        Ok(())
    })
}

fn min_length_validator() -> Validator {
    Validator::new(KindClass::Text, 1, |value, args| {
        let text = expect_text(value)?;
        let min = expect_int_arg(args, 0)?;
        if (text.chars().count() as i64) < min {
            return Err(format!("must be at least {min} characters"));
        }
        Ok(())
    })
}

fn max_length_validator() -> Validator {
    Validator::new(KindClass::Text, 1, |value, args| {
        let text = expect_text(value)?;
        let max = expect_int_arg(args, 0)?;
        if (text.chars().count() as i64) > max {
            return Err(format!("must be at most {max} characters"));
        }
        Ok(())
    })
}

fn in_range_validator() -> Validator {
    Validator::new(KindClass::Integer, 2, |value, args| {
        let n = match value {
            Value::Integer(n) => *n,
            other => {
                return Err(format!(
                    "expected an integer value, got {}",
                    other.kind_name()
                ))
            }
        };
        let low = expect_int_arg(args, 0)?;
        let high = expect_int_arg(args, 1)?;
        if n < low || n > high {
            return Err(format!("must be between {low} and {high}"));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::kind::Kind;

    fn model_with(columns: Vec<Column>) -> (Catalog, Arc<Model>) {
        let catalog = Catalog::new();
        let model = catalog.register("User", columns).unwrap();
        (catalog, model)
    }

    #[test]
    fn email_accepts_and_rejects() {
        let set = ValidatorSet::with_builtins();
        let email = set.get("email").unwrap();
        assert!((email.func)(&Value::Text("a@b.io".into()), &[]).is_ok());
        assert!((email.func)(&Value::Text("a@b@c.io".into()), &[]).is_err());
        assert!((email.func)(&Value::Text("a@nodot".into()), &[]).is_err());
    }

    #[test]
    fn password_policy() {
        let set = ValidatorSet::with_builtins();
        let password = set.get("password").unwrap();
        assert!((password.func)(&Value::Text("Tr1cky!passphrase".into()), &[]).is_ok());
        assert!((password.func)(&Value::Text("short1!A".into()), &[]).is_err());
        assert!((password.func)(&Value::Text("nocapsatall1!aaa".into()), &[]).is_err());
    }

    #[test]
    fn run_is_fail_fast_in_declaration_order() {
        let (catalog, model) = model_with(vec![Column::new("Email", Kind::text())
            .validate_with("min_length", vec![Value::Integer(50)])
            .validate("email")]);
        let record = Record::new("User").set("Email", "a@b.io");
        let err = run_validators(&model, &record, catalog.validators()).unwrap_err();
        assert_eq!(err.validator, "min_length");
        assert_eq!(err.column, "Email");
    }

    #[test]
    fn null_on_nullable_column_skips_validators() {
        let (catalog, model) =
            model_with(vec![Column::new("Email", Kind::text()).nullable().validate("email")]);
        let record = Record::new("User");
        run_validators(&model, &record, catalog.validators()).unwrap();
    }

    #[test]
    fn in_range_checks_integers() {
        let (catalog, model) = model_with(vec![Column::new("Age", Kind::Integer)
            .validate_with("in_range", vec![Value::Integer(0), Value::Integer(130)])]);
        let ok = Record::new("User").set("Age", 30i64);
        run_validators(&model, &ok, catalog.validators()).unwrap();
        let bad = Record::new("User").set("Age", 200i64);
        let err = run_validators(&model, &bad, catalog.validators()).unwrap_err();
        assert_eq!(err.validator, "in_range");
        assert_eq!(err.value, Value::Integer(200));
    }
}
