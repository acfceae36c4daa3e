//! Query compilation.
//!
//! Compilation turns a [`Query`] into dialect SQL plus a positional
//! argument list, checked against the catalog: every named column must
//! exist, every placeholder marker must have exactly one argument, and
//! reference columns pull in a join against their target so the caller
//! gets whole related rows back, one level deep.

use tracing::debug;

use chisel_core::{Catalog, Column, Condition, Kind, Model, Record, Value, PLACEHOLDER};

use crate::error::{QueryError, Result};
use crate::query::{Direction, Query};

/// A compiled SELECT: statement text, bound arguments, and the flat
/// projection the result rows will follow.
///
/// The projection lists one [`Column`] per result cell. A reference
/// column is immediately followed by every column of its target model,
/// in the target's declared order; the marshaller relies on that layout.
#[derive(Debug)]
pub struct CompiledQuery {
    /// Statement text with `$1`-style parameters.
    pub sql: String,
    /// Arguments in parameter order.
    pub args: Vec<Value>,
    /// Result cell layout.
    pub projection: Vec<Column>,
}

/// A compiled non-SELECT statement.
#[derive(Debug)]
pub struct CompiledStatement {
    /// Statement text with `$1`-style parameters.
    pub sql: String,
    /// Arguments in parameter order.
    pub args: Vec<Value>,
}

/// Compiles a query against the catalog.
///
/// # Errors
///
/// Unregistered model, unknown column, a direction without an order
/// column, marker/argument mismatches, and record arguments that lack a
/// usable primary-key value.
pub fn compile(catalog: &Catalog, query: &Query) -> Result<CompiledQuery> {
    let model = lookup(catalog, &query.model)?;
    let table = model.name();

    let selected: Vec<&Column> = if query.columns.is_empty() {
        model.columns().iter().collect()
    } else {
        query
            .columns
            .iter()
            .map(|name| {
                model.column(name).ok_or_else(|| QueryError::UnknownColumn {
                    model: table.to_string(),
                    column: name.clone(),
                })
            })
            .collect::<Result<_>>()?
    };

    let mut select_list = Vec::new();
    let mut joins = Vec::new();
    let mut projection = Vec::new();
    for column in selected {
        select_list.push(format!("\"{table}\".\"{}\"", column.name));
        projection.push(column.clone());
        if let Kind::Reference { target, .. } = &column.kind {
            let target_model = lookup(catalog, target)?;
            let pk = target_model
                .primary_key()
                .ok_or_else(|| QueryError::MissingPrimaryKey {
                    model: target_model.name().to_string(),
                })?;
            // A LEFT join keeps rows whose nullable reference is NULL;
            // a NOT NULL reference always has a partner row.
            let join_kind = if column.nullable { "LEFT JOIN" } else { "INNER JOIN" };
            joins.push(format!(
                " {join_kind} \"{0}\" ON \"{table}\".\"{1}\" = \"{0}\".\"{2}\"",
                target_model.name(),
                column.name,
                pk.name
            ));
            for target_column in target_model.columns() {
                select_list.push(format!(
                    "\"{}\".\"{}\"",
                    target_model.name(),
                    target_column.name
                ));
                projection.push(target_column.clone());
            }
        }
    }

    let mut sql = format!(
        "SELECT {}{} FROM \"{table}\"",
        if query.distinct { "DISTINCT " } else { "" },
        select_list.join(", ")
    );
    for join in joins {
        sql.push_str(&join);
    }

    let mut args = Vec::new();
    if !query.conditions.is_empty() {
        let (clause, condition_args) = render_conditions(&query.conditions)?;
        args = condition_args;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }

    match (&query.order_column, query.order_direction) {
        (Some(column), direction) => {
            if model.column(column).is_none() {
                return Err(QueryError::UnknownColumn {
                    model: table.to_string(),
                    column: column.clone(),
                });
            }
            sql.push_str(&format!(
                " ORDER BY \"{table}\".\"{column}\" {}",
                direction.unwrap_or(Direction::Asc).to_sql()
            ));
        }
        (None, Some(_)) => return Err(QueryError::OrderWithoutColumn),
        (None, None) => {}
    }
    sql.push(';');

    let sql = number_placeholders(&sql, args.len())?;
    let args = resolve_args(catalog, args)?;
    debug!(model = table, sql = %sql, "query compiled");
    Ok(CompiledQuery {
        sql,
        args,
        projection,
    })
}

/// Compiles an INSERT for a record.
///
/// Columns are taken in the model's declared order. Autoincrement columns
/// without a value insert `DEFAULT`; absent values on nullable columns
/// are omitted; an absent value on any other column is an error.
///
/// # Errors
///
/// Unregistered model, missing required values, and record arguments
/// lacking a primary-key value.
pub fn compile_insert(catalog: &Catalog, record: &Record) -> Result<CompiledStatement> {
    let model = lookup(catalog, record.model())?;
    let table = model.name();

    let mut columns = Vec::new();
    let mut params = Vec::new();
    let mut args = Vec::new();
    for column in model.columns() {
        match record.get(&column.name) {
            Some(value) => {
                columns.push(format!("\"{}\"", column.name));
                args.push(resolve_value(catalog, value.clone())?);
                params.push(format!("${}", args.len()));
            }
            None if column.autoincrement => {
                columns.push(format!("\"{}\"", column.name));
                params.push(String::from("DEFAULT"));
            }
            None if column.nullable => {}
            None => {
                return Err(QueryError::MissingColumn {
                    model: table.to_string(),
                    column: column.name.clone(),
                })
            }
        }
    }

    let sql = format!(
        "INSERT INTO \"{table}\" ({}) VALUES ({});",
        columns.join(", "),
        params.join(", ")
    );
    debug!(model = table, sql = %sql, "insert compiled");
    Ok(CompiledStatement { sql, args })
}

/// Compiles a DELETE for a model. With no conditions every row goes.
///
/// # Errors
///
/// Unregistered model, marker/argument mismatches, and record arguments
/// lacking a primary-key value.
pub fn compile_delete(
    catalog: &Catalog,
    model_name: &str,
    conditions: &[Condition],
) -> Result<CompiledStatement> {
    let model = lookup(catalog, model_name)?;
    let table = model.name();

    let mut sql = format!("DELETE FROM \"{table}\"");
    let mut args = Vec::new();
    if !conditions.is_empty() {
        let (clause, condition_args) = render_conditions(conditions)?;
        args = condition_args;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }
    sql.push(';');

    let sql = number_placeholders(&sql, args.len())?;
    let args = resolve_args(catalog, args)?;
    debug!(model = table, sql = %sql, "delete compiled");
    Ok(CompiledStatement { sql, args })
}

fn lookup(catalog: &Catalog, model: &str) -> Result<std::sync::Arc<Model>> {
    catalog
        .get(model)
        .ok_or_else(|| QueryError::ModelNotRegistered {
            model: model.to_string(),
        })
}

/// Joins condition templates with AND and collects their arguments.
///
/// Each fragment must balance its own markers against its own arguments;
/// checking only the aggregate would let two unbalanced fragments cancel
/// out and every later parameter bind one position off.
fn render_conditions(conditions: &[Condition]) -> Result<(String, Vec<Value>)> {
    let mut templates = Vec::with_capacity(conditions.len());
    let mut args = Vec::new();
    for condition in conditions {
        if condition.placeholder_count() != condition.args().len() {
            return Err(QueryError::PlaceholderMismatch {
                placeholders: condition.placeholder_count(),
                arguments: condition.args().len(),
            });
        }
        templates.push(condition.template());
        args.extend_from_slice(condition.args());
    }
    Ok((templates.join(" AND "), args))
}

/// Replaces placeholder markers left to right with `$1`-style parameters,
/// insisting on exactly one marker per argument.
fn number_placeholders(sql: &str, arguments: usize) -> Result<String> {
    let placeholders = sql.matches(PLACEHOLDER).count();
    if placeholders != arguments {
        return Err(QueryError::PlaceholderMismatch {
            placeholders,
            arguments,
        });
    }
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    let mut n = 0;
    while let Some(at) = rest.find(PLACEHOLDER) {
        n += 1;
        out.push_str(&rest[..at]);
        out.push_str(&format!("${n}"));
        rest = &rest[at + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_args(catalog: &Catalog, args: Vec<Value>) -> Result<Vec<Value>> {
    args.into_iter()
        .map(|arg| resolve_value(catalog, arg))
        .collect()
}

/// Record arguments stand in for their primary-key value: filtering a
/// foreign-key column by a whole row means filtering by that row's key.
fn resolve_value(catalog: &Catalog, value: Value) -> Result<Value> {
    let Value::Record(record) = value else {
        return Ok(value);
    };
    let model = lookup(catalog, record.model())?;
    let pk = model
        .primary_key()
        .ok_or_else(|| QueryError::MissingPrimaryKey {
            model: model.name().to_string(),
        })?;
    match record.get(&pk.name) {
        Some(Value::Record(_)) | None => Err(QueryError::MissingPrimaryKey {
            model: model.name().to_string(),
        }),
        Some(key) => Ok(key.clone()),
    }
}
