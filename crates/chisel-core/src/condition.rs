//! Condition fragments for WHERE clauses.
//!
//! A [`Condition`] pairs an opaque predicate template with the values it
//! binds. Templates use the engine-internal [`PLACEHOLDER`] marker; the
//! query compiler substitutes markers left-to-right across the whole
//! condition list with the dialect's positional parameters (`$1`, `$2`,
//! ...), so marker count and argument order must line up exactly. Every
//! constructor here maintains that invariant; [`Condition::raw`] is checked
//! by the compiler instead.
//!
//! Conditions in a query are joined with AND. OR and NOT are explicit
//! combinators producing a single composite condition.

use crate::value::{ToValue, Value};

/// Marker substituted with a positional parameter at compile time.
pub const PLACEHOLDER: &str = "{?}";

/// A predicate fragment and its bound arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    template: String,
    args: Vec<Value>,
}

impl Condition {
    fn comparison(column: &str, op: &str, value: impl ToValue) -> Self {
        Self {
            template: format!("\"{column}\" {op} {PLACEHOLDER}"),
            args: vec![value.to_value()],
        }
    }

    /// `column = value`
    pub fn equals(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, "=", value)
    }

    /// `column <> value`
    pub fn not_equals(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, "<>", value)
    }

    /// `column > value`
    pub fn greater_than(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, ">", value)
    }

    /// `column >= value`
    pub fn greater_or_equal(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, ">=", value)
    }

    /// `column < value`
    pub fn less_than(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, "<", value)
    }

    /// `column <= value`
    pub fn less_or_equal(column: &str, value: impl ToValue) -> Self {
        Self::comparison(column, "<=", value)
    }

    /// `column LIKE pattern`
    pub fn like(column: &str, pattern: &str) -> Self {
        Self::comparison(column, "LIKE", pattern)
    }

    /// `column BETWEEN low AND high`
    pub fn between(column: &str, low: impl ToValue, high: impl ToValue) -> Self {
        Self {
            template: format!("\"{column}\" BETWEEN {PLACEHOLDER} AND {PLACEHOLDER}"),
            args: vec![low.to_value(), high.to_value()],
        }
    }

    /// `column IN (values...)`
    pub fn any_of(column: &str, values: Vec<Value>) -> Self {
        let markers: Vec<&str> = values.iter().map(|_| PLACEHOLDER).collect();
        Self {
            template: format!("\"{column}\" IN ({})", markers.join(", ")),
            args: values,
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: &str) -> Self {
        Self {
            template: format!("\"{column}\" IS NULL"),
            args: Vec::new(),
        }
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: &str) -> Self {
        Self {
            template: format!("\"{column}\" IS NOT NULL"),
            args: Vec::new(),
        }
    }

    /// An arbitrary predicate template with bound arguments.
    ///
    /// The template must contain exactly one [`PLACEHOLDER`] per argument;
    /// the compiler rejects the whole query otherwise.
    pub fn raw(template: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }

    /// Combines two conditions so that either may hold.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut args = self.args;
        args.extend(other.args);
        Self {
            template: format!("({} OR {})", self.template, other.template),
            args,
        }
    }

    /// Combines two conditions so that both must hold.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut args = self.args;
        args.extend(other.args);
        Self {
            template: format!("({} AND {})", self.template, other.template),
            args,
        }
    }

    /// Negates the condition.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self {
            template: format!("NOT ({})", self.template),
            args: self.args,
        }
    }

    /// Returns the predicate template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the bound arguments in template order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Consumes the condition, returning template and arguments.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.template, self.args)
    }

    /// Counts the placeholder markers in the template.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.template.matches(PLACEHOLDER).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_binds_one_argument() {
        let c = Condition::equals("Name", "ada");
        assert_eq!(c.template(), "\"Name\" = {?}");
        assert_eq!(c.args().len(), 1);
        assert_eq!(c.placeholder_count(), 1);
    }

    #[test]
    fn between_binds_two() {
        let c = Condition::between("Age", 18i64, 65i64);
        assert_eq!(c.template(), "\"Age\" BETWEEN {?} AND {?}");
        assert_eq!(c.placeholder_count(), 2);
        assert_eq!(c.args().len(), 2);
    }

    #[test]
    fn any_of_binds_each_value() {
        let c = Condition::any_of(
            "Status",
            vec![Value::Text("open".into()), Value::Text("held".into())],
        );
        assert_eq!(c.template(), "\"Status\" IN ({?}, {?})");
        assert_eq!(c.args().len(), 2);
    }

    #[test]
    fn composition_concatenates_templates_and_args() {
        let c = Condition::equals("A", 1i64).or(Condition::equals("B", 2i64));
        assert_eq!(c.template(), "(\"A\" = {?} OR \"B\" = {?})");
        assert_eq!(c.args(), &[Value::Integer(1), Value::Integer(2)]);
        assert_eq!(c.placeholder_count(), c.args().len());
    }

    #[test]
    fn not_keeps_args() {
        let c = Condition::less_than("Age", 18i64).not();
        assert_eq!(c.template(), "NOT (\"Age\" < {?})");
        assert_eq!(c.args().len(), 1);
    }

    #[test]
    fn null_checks_bind_nothing() {
        assert_eq!(Condition::is_null("Bio").args().len(), 0);
        assert_eq!(Condition::is_not_null("Bio").placeholder_count(), 0);
    }
}
