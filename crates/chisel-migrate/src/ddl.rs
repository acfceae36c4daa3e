//! DDL rendering.
//!
//! Statements are rendered from the catalog's view of a model, with every
//! identifier double-quoted so mixed-case model and column names survive
//! the round trip through PostgreSQL's case folding.

use chisel_core::{Catalog, Column, Kind};

use crate::error::Result;

/// Renders the column definition fragment used inside CREATE TABLE and
/// ADD COLUMN.
pub(crate) fn column_def(catalog: &Catalog, column: &Column) -> Result<String> {
    let mut def = format!(
        "\"{}\" {}",
        column.name,
        catalog.sql_type(&column.kind, column.autoincrement)?
    );
    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if column.unique {
        def.push_str(" UNIQUE");
    }
    if let Kind::Reference { target, on_delete } = &column.kind {
        let model = catalog.get(target).ok_or_else(|| {
            chisel_core::SchemaError::TargetModelNotFound {
                column: column.name.clone(),
                target: target.clone(),
            }
        })?;
        let pk = model.primary_key().ok_or_else(|| {
            chisel_core::SchemaError::TargetHasNoPrimaryKey {
                target: model.name().to_string(),
            }
        })?;
        def.push_str(&format!(
            " REFERENCES \"{}\"(\"{}\") ON DELETE {}",
            model.name(),
            pk.name,
            on_delete.to_sql()
        ));
    }
    Ok(def)
}

/// Renders the CREATE TABLE statement for a model.
///
/// # Errors
///
/// Fails when a reference column points at a model missing from the
/// catalog or lacking a primary key.
pub fn create_table_sql(catalog: &Catalog, name: &str, columns: &[Column]) -> Result<String> {
    let mut defs = Vec::with_capacity(columns.len());
    for column in columns {
        defs.push(column_def(catalog, column)?);
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS \"{name}\" ({});",
        defs.join(", ")
    ))
}

/// Renders an ADD COLUMN statement.
///
/// # Errors
///
/// Same failure modes as [`create_table_sql`].
pub fn add_column_sql(catalog: &Catalog, table: &str, column: &Column) -> Result<String> {
    Ok(format!(
        "ALTER TABLE \"{table}\" ADD {};",
        column_def(catalog, column)?
    ))
}

/// Renders a DROP COLUMN statement.
#[must_use]
pub fn drop_column_sql(table: &str, column: &str) -> String {
    format!("ALTER TABLE \"{table}\" DROP COLUMN \"{column}\";")
}

/// Renders a DROP TABLE statement. CASCADE, so dependent foreign keys go
/// with it.
#[must_use]
pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE \"{table}\" CASCADE;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_core::OnDelete;

    fn catalog_with_user() -> Catalog {
        let catalog = Catalog::new();
        catalog
            .register(
                "User",
                vec![
                    Column::new("ID", Kind::Integer).primary_key().autoincrement(),
                    Column::new("Email", Kind::varchar(255)).unique(),
                ],
            )
            .unwrap();
        catalog
    }

    #[test]
    fn create_table_renders_constraints_in_order() {
        let catalog = catalog_with_user();
        let model = catalog.get("User").unwrap();
        let sql = create_table_sql(&catalog, model.name(), model.columns()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"User\" (\
             \"ID\" bigserial NOT NULL PRIMARY KEY, \
             \"Email\" varchar(255) NOT NULL UNIQUE);"
        );
    }

    #[test]
    fn reference_column_renders_foreign_key_clause() {
        let catalog = catalog_with_user();
        catalog
            .register(
                "Task",
                vec![
                    Column::new("User", Kind::reference("User", OnDelete::Cascade)),
                    Column::new("Title", Kind::text()),
                ],
            )
            .unwrap();
        let model = catalog.get("Task").unwrap();
        let sql = create_table_sql(&catalog, model.name(), model.columns()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"Task\" (\
             \"User\" bigint NOT NULL REFERENCES \"User\"(\"ID\") ON DELETE CASCADE, \
             \"Title\" text NOT NULL);"
        );
    }

    #[test]
    fn add_and_drop_column_statements() {
        let catalog = catalog_with_user();
        let column = Column::new("Active", Kind::Boolean).nullable();
        assert_eq!(
            add_column_sql(&catalog, "User", &column).unwrap(),
            "ALTER TABLE \"User\" ADD \"Active\" boolean;"
        );
        assert_eq!(
            drop_column_sql("User", "Active"),
            "ALTER TABLE \"User\" DROP COLUMN \"Active\";"
        );
        assert_eq!(drop_table_sql("User"), "DROP TABLE \"User\" CASCADE;");
    }
}
