//! Live-schema introspection against the PostgreSQL system catalog.
//!
//! The attribute query returns one row per physical column, ordered by
//! `attnum` — physical position, not name, is what lines introspected
//! columns up with compiled rows. Table existence is probed separately so
//! that "table absent" and "table exists with no usable columns" never
//! get conflated.

use chisel_core::{Column, Executor, Kind, Value};

use crate::error::{MigrateError, Result};

/// Existence probe for an ordinary table in a given schema.
pub const TABLE_EXISTS_SQL: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_class c
    JOIN pg_namespace n ON c.relnamespace = n.oid
    WHERE c.relname = $1 AND n.nspname = $2 AND c.relkind = 'r'
)";

/// Per-column attribute query: name, nullability, primary-key membership,
/// uniqueness, physical type name, and declared varchar length.
pub const COLUMNS_SQL: &str = "SELECT
    a.attname AS column_name,
    NOT a.attnotnull AS nullable,
    (SELECT count(*) = 1 FROM pg_constraint c
        WHERE c.conrelid = a.attrelid AND c.conkey[1] = a.attnum AND c.contype = 'p')
        AS primary_key,
    (SELECT count(*) = 1 FROM pg_constraint c
        WHERE c.conrelid = a.attrelid AND c.conkey[1] = a.attnum AND c.contype = 'u')
        AS is_unique,
    t.typname AS data_type,
    CASE WHEN t.typname = 'varchar' THEN a.atttypmod - 4 ELSE NULL END
        AS character_maximum_length
FROM pg_attribute a
JOIN pg_type t ON a.atttypid = t.oid
JOIN pg_class c ON a.attrelid = c.oid
JOIN pg_namespace n ON c.relnamespace = n.oid
WHERE a.attnum > 0 AND NOT a.attisdropped AND c.relname = $1 AND n.nspname = $2
ORDER BY a.attnum";

/// Returns whether the table exists in the schema.
///
/// # Errors
///
/// Database failures, or a malformed probe result.
pub async fn table_exists<E: Executor>(executor: &E, table: &str, schema: &str) -> Result<bool> {
    let args = [
        Value::Text(table.to_string()),
        Value::Text(schema.to_string()),
    ];
    let rows = executor.query(TABLE_EXISTS_SQL, &args).await?;
    match rows.rows.first().and_then(|row| row.first()) {
        Some(Value::Boolean(exists)) => Ok(*exists),
        other => Err(MigrateError::MalformedCatalogRow(format!(
            "existence probe returned {other:?}"
        ))),
    }
}

/// Reads the table's current columns from the system catalog.
///
/// # Errors
///
/// `TableNotFound` when the table is absent (checked explicitly, never
/// inferred from an empty row set), `UnknownDatabaseType` for physical
/// types the engine does not model, and database failures verbatim.
pub async fn current_columns<E: Executor>(
    executor: &E,
    table: &str,
    schema: &str,
) -> Result<Vec<Column>> {
    if !table_exists(executor, table, schema).await? {
        return Err(MigrateError::TableNotFound {
            table: table.to_string(),
            schema: schema.to_string(),
        });
    }

    let args = [
        Value::Text(table.to_string()),
        Value::Text(schema.to_string()),
    ];
    let rows = executor.query(COLUMNS_SQL, &args).await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows.rows {
        columns.push(column_from_row(row)?);
    }
    Ok(columns)
}

fn column_from_row(row: &[Value]) -> Result<Column> {
    let [name, nullable, primary_key, unique, type_name, max_length] = row else {
        return Err(MigrateError::MalformedCatalogRow(format!(
            "expected 6 attribute cells, got {}",
            row.len()
        )));
    };

    let name = text_cell(name, "column_name")?;
    let nullable = bool_cell(nullable, "nullable")?;
    let primary_key = bool_cell(primary_key, "primary_key")?;
    let unique = bool_cell(unique, "is_unique")?;
    let type_name = text_cell(type_name, "data_type")?;
    let max_length = match max_length {
        Value::Null => None,
        Value::Integer(n) => Some(u32::try_from(*n).map_err(|_| {
            MigrateError::MalformedCatalogRow(format!("negative varchar length {n}"))
        })?),
        other => {
            return Err(MigrateError::MalformedCatalogRow(format!(
                "character_maximum_length holds {}",
                other.kind_name()
            )))
        }
    };

    let kind = Kind::from_sql(type_name, max_length).ok_or_else(|| {
        MigrateError::UnknownDatabaseType {
            type_name: type_name.to_string(),
            column: name.to_string(),
        }
    })?;

    let mut column = Column::new(name, kind);
    column.nullable = nullable;
    column.primary_key = primary_key;
    column.unique = unique;
    Ok(column)
}

fn text_cell<'a>(value: &'a Value, cell: &str) -> Result<&'a str> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(MigrateError::MalformedCatalogRow(format!(
            "{cell} holds {}",
            other.kind_name()
        ))),
    }
}

fn bool_cell(value: &Value, cell: &str) -> Result<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(MigrateError::MalformedCatalogRow(format!(
            "{cell} holds {}",
            other.kind_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute_row(
        name: &str,
        nullable: bool,
        primary_key: bool,
        unique: bool,
        type_name: &str,
        max_length: Option<i64>,
    ) -> Vec<Value> {
        vec![
            Value::Text(name.to_string()),
            Value::Boolean(nullable),
            Value::Boolean(primary_key),
            Value::Boolean(unique),
            Value::Text(type_name.to_string()),
            max_length.map_or(Value::Null, Value::Integer),
        ]
    }

    #[test]
    fn decodes_integer_primary_key() {
        let column = column_from_row(&attribute_row("id", false, true, false, "int4", None))
            .unwrap();
        assert_eq!(column.name, "id");
        assert_eq!(column.kind, Kind::Integer);
        assert!(column.primary_key);
        assert!(!column.nullable);
    }

    #[test]
    fn decodes_varchar_with_length() {
        let column =
            column_from_row(&attribute_row("email", true, false, true, "varchar", Some(255)))
                .unwrap();
        assert_eq!(column.kind, Kind::varchar(255));
        assert!(column.unique);
        assert!(column.nullable);
    }

    #[test]
    fn unknown_physical_type_is_a_hard_error() {
        let err = column_from_row(&attribute_row("doc", true, false, false, "tsvector", None))
            .unwrap_err();
        assert!(matches!(err, MigrateError::UnknownDatabaseType { .. }));
    }

    #[test]
    fn short_row_is_malformed() {
        let err = column_from_row(&[Value::Text("id".into())]).unwrap_err();
        assert!(matches!(err, MigrateError::MalformedCatalogRow(_)));
    }
}
