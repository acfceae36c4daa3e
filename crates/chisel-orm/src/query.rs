//! The query description builder.
//!
//! A [`Query`] is a plain description: which model, which columns, which
//! conditions, what ordering. Nothing is validated until
//! [`compile`](crate::compile) checks it against the catalog, so a query
//! can be built up front and reused.

use chisel_core::Condition;

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    pub(crate) fn to_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A declarative SELECT description for one model.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) model: String,
    pub(crate) columns: Vec<String>,
    pub(crate) distinct: bool,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) order_column: Option<String>,
    pub(crate) order_direction: Option<Direction>,
}

impl Query {
    /// Starts a query against the named model. With no further calls the
    /// query selects every column.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Restricts the selection to one more named column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Requests DISTINCT rows.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a condition. Conditions are joined with AND; use
    /// [`Condition::or`] for alternatives.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Orders the result by a column, ascending unless
    /// [`Query::direction`] says otherwise.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_column = Some(column.into());
        self
    }

    /// Sets the sort direction. Compilation rejects a direction given
    /// without an order column.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.order_direction = Some(direction);
        self
    }

    /// Returns the target model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates() {
        let query = Query::new("User")
            .column("Name")
            .column("Email")
            .distinct()
            .filter(Condition::equals("Name", "ada"))
            .order_by("Name")
            .direction(Direction::Desc);
        assert_eq!(query.model(), "User");
        assert_eq!(query.columns, vec!["Name", "Email"]);
        assert!(query.distinct);
        assert_eq!(query.conditions.len(), 1);
        assert_eq!(query.order_column.as_deref(), Some("Name"));
        assert_eq!(query.order_direction, Some(Direction::Desc));
    }
}
