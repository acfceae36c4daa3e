//! Row marshalling: raw result cells back into records.
//!
//! The marshaller walks the compiled projection and the row in lockstep.
//! A reference column consumes its own cell (the raw foreign-key value)
//! plus one cell per column of the target model, which the compiler
//! placed immediately after it; those become a nested [`Record`] under
//! the reference column's name. References inside the nested row are not
//! expanded — related rows come back one level deep.

use chisel_core::{Catalog, Column, Kind, KindClass, Record, Value};

use crate::error::{QueryError, Result};

/// Builds a record from one result row.
///
/// # Errors
///
/// `RowWidth` when the row and projection disagree on cell count,
/// `TypeMismatch` when a cell does not fit its column (NULL only fits
/// nullable columns), and `ModelNotRegistered` when a reference target
/// has vanished from the catalog since compilation.
pub fn record_from_row(
    catalog: &Catalog,
    model_name: &str,
    projection: &[Column],
    row: &[Value],
) -> Result<Record> {
    let model = catalog
        .get(model_name)
        .ok_or_else(|| QueryError::ModelNotRegistered {
            model: model_name.to_string(),
        })?;

    let mut record = Record::new(model.name());
    let mut cell = 0;
    let mut col = 0;
    while col < projection.len() {
        let column = &projection[col];
        col += 1;
        let value = take(row, &mut cell, projection.len())?;

        if let Kind::Reference { target, .. } = &column.kind {
            let target_model =
                catalog
                    .get(target)
                    .ok_or_else(|| QueryError::ModelNotRegistered {
                        model: target.clone(),
                    })?;
            check_cell(column, value)?;
            // A NULL key means the left join produced no partner row; the
            // partner cells are all NULL and carry no information.
            let absent = value.is_null();
            let mut nested = Record::new(target_model.name());
            for target_column in target_model.columns() {
                col += 1;
                let nested_value = take(row, &mut cell, projection.len())?;
                if !absent {
                    check_cell(target_column, nested_value)?;
                    nested.push(target_column.name.clone(), nested_value.clone());
                }
            }
            if absent {
                record.push(column.name.clone(), Value::Null);
            } else {
                record.push(column.name.clone(), Value::Record(Box::new(nested)));
            }
        } else {
            check_cell(column, value)?;
            record.push(column.name.clone(), value.clone());
        }
    }

    if cell != row.len() {
        return Err(QueryError::RowWidth {
            expected: cell,
            actual: row.len(),
        });
    }
    Ok(record)
}

fn take<'a>(row: &'a [Value], cell: &mut usize, expected: usize) -> Result<&'a Value> {
    let value = row.get(*cell).ok_or(QueryError::RowWidth {
        expected,
        actual: row.len(),
    })?;
    *cell += 1;
    Ok(value)
}

/// Checks one cell against its column: NULL needs a nullable column,
/// anything else must match the column's kind class. Reference columns
/// hold plain integers on the wire.
fn check_cell(column: &Column, value: &Value) -> Result<()> {
    if value.is_null() {
        if column.nullable {
            return Ok(());
        }
        return Err(mismatch(column, value));
    }
    let fits = match column.kind.class() {
        KindClass::Integer | KindClass::Reference => matches!(value, Value::Integer(_)),
        KindClass::Text => matches!(value, Value::Text(_)),
        KindClass::Boolean => matches!(value, Value::Boolean(_)),
    };
    if fits {
        Ok(())
    } else {
        Err(mismatch(column, value))
    }
}

fn mismatch(column: &Column, value: &Value) -> QueryError {
    QueryError::TypeMismatch {
        column: column.name.clone(),
        expected: column.kind.class().to_string(),
        actual: value.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::query::Query;
    use chisel_core::OnDelete;

    fn catalog() -> Catalog {
        let catalog = Catalog::new();
        catalog
            .register(
                "User",
                vec![
                    Column::new("ID", Kind::Integer).primary_key(),
                    Column::new("Name", Kind::text()),
                ],
            )
            .unwrap();
        catalog
            .register(
                "Task",
                vec![
                    Column::new("ID", Kind::Integer).primary_key(),
                    Column::new("User", Kind::reference("User", OnDelete::Cascade)),
                    Column::new("Title", Kind::text()),
                ],
            )
            .unwrap();
        catalog
    }

    #[test]
    fn flat_row_marshals_by_position() {
        let catalog = catalog();
        let compiled = compile(&catalog, &Query::new("User")).unwrap();
        let record = record_from_row(
            &catalog,
            "User",
            &compiled.projection,
            &[Value::Integer(1), Value::Text("ada".into())],
        )
        .unwrap();
        assert_eq!(record.int("ID").unwrap(), 1);
        assert_eq!(record.text("Name").unwrap(), "ada");
    }

    #[test]
    fn reference_cells_collapse_into_a_nested_record() {
        let catalog = catalog();
        let compiled = compile(&catalog, &Query::new("Task")).unwrap();
        // Task.ID, Task.User, User.ID, User.Name, Task.Title
        let record = record_from_row(
            &catalog,
            "Task",
            &compiled.projection,
            &[
                Value::Integer(10),
                Value::Integer(1),
                Value::Integer(1),
                Value::Text("ada".into()),
                Value::Text("ship".into()),
            ],
        )
        .unwrap();
        assert_eq!(record.int("ID").unwrap(), 10);
        assert_eq!(record.text("Title").unwrap(), "ship");
        let user = record.record("User").unwrap();
        assert_eq!(user.model(), "User");
        assert_eq!(user.int("ID").unwrap(), 1);
        assert_eq!(user.text("Name").unwrap(), "ada");
    }

    #[test]
    fn null_reference_stays_null() {
        let catalog = Catalog::new();
        catalog
            .register(
                "User",
                vec![
                    Column::new("ID", Kind::Integer).primary_key(),
                    Column::new("Name", Kind::text()),
                ],
            )
            .unwrap();
        catalog
            .register(
                "Task",
                vec![
                    Column::new("ID", Kind::Integer).primary_key(),
                    Column::new("User", Kind::reference("User", OnDelete::SetNull)).nullable(),
                ],
            )
            .unwrap();
        let compiled = compile(&catalog, &Query::new("Task")).unwrap();
        let record = record_from_row(
            &catalog,
            "Task",
            &compiled.projection,
            &[
                Value::Integer(10),
                Value::Null,
                Value::Null,
                Value::Null,
            ],
        )
        .unwrap();
        assert!(record.get("User").unwrap().is_null());
    }

    #[test]
    fn wrong_shape_names_both_sides() {
        let catalog = catalog();
        let compiled = compile(&catalog, &Query::new("User")).unwrap();
        let err = record_from_row(
            &catalog,
            "User",
            &compiled.projection,
            &[Value::Text("one".into()), Value::Text("ada".into())],
        )
        .unwrap_err();
        match err {
            QueryError::TypeMismatch {
                column,
                expected,
                actual,
            } => {
                assert_eq!(column, "ID");
                assert_eq!(expected, "integer");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_in_not_null_column_is_a_mismatch() {
        let catalog = catalog();
        let compiled = compile(&catalog, &Query::new("User")).unwrap();
        let err = record_from_row(
            &catalog,
            "User",
            &compiled.projection,
            &[Value::Integer(1), Value::Null],
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn short_and_long_rows_are_rejected() {
        let catalog = catalog();
        let compiled = compile(&catalog, &Query::new("User")).unwrap();
        assert!(matches!(
            record_from_row(&catalog, "User", &compiled.projection, &[Value::Integer(1)]),
            Err(QueryError::RowWidth { .. })
        ));
        assert!(matches!(
            record_from_row(
                &catalog,
                "User",
                &compiled.projection,
                &[
                    Value::Integer(1),
                    Value::Text("ada".into()),
                    Value::Boolean(true)
                ]
            ),
            Err(QueryError::RowWidth { .. })
        ));
    }
}
