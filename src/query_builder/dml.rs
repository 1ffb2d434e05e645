use crate::error::SqlProxyError;
use crate::model::{FieldValue, MutationRequest};

use super::{Statement, validate_names, validate_table};

/// `INSERT INTO <table> (<a>,<b>,...) VALUES (?1,?2,...)`, preserving field order.
///
/// # Errors
/// Returns [`SqlProxyError::InvalidRequest`] for an empty table name, zero fields, or an empty
/// field name.
pub fn build_insert(table: &str, fields: &[FieldValue]) -> Result<Statement, SqlProxyError> {
    validate_table(table)?;
    validate_names(fields.iter().map(|f| f.name.as_str()))?;

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let mut stmt = Statement::new(String::new());
    let placeholders: Vec<String> = fields.iter().map(|f| stmt.bind(&f.value)).collect();
    stmt.sql = format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        names.join(","),
        placeholders.join(",")
    );
    Ok(stmt)
}

/// `UPDATE <table> SET <a> = ?1, ... [WHERE <cond> = ?N]`.
///
/// The WHERE clause is only emitted for a condition with a non-empty name. Without one the
/// statement updates every row in the table.
///
/// # Errors
/// Returns [`SqlProxyError::InvalidRequest`] for an empty table name, zero fields, or an empty
/// field name.
pub fn build_update(
    table: &str,
    fields: &[FieldValue],
    condition: Option<&FieldValue>,
) -> Result<Statement, SqlProxyError> {
    validate_table(table)?;
    validate_names(fields.iter().map(|f| f.name.as_str()))?;

    let mut stmt = Statement::new(String::new());
    let assignments: Vec<String> = fields
        .iter()
        .map(|f| format!("{} = {}", f.name, stmt.bind(&f.value)))
        .collect();
    stmt.sql = format!("UPDATE {table} SET {}", assignments.join(", "));
    stmt.push_condition(condition);
    Ok(stmt)
}

/// Build the statement a queued mutation executes.
///
/// # Errors
/// See [`build_insert`] and [`build_update`].
pub fn build_mutation(request: &MutationRequest) -> Result<Statement, SqlProxyError> {
    if request.is_insert {
        build_insert(&request.table, &request.fields)
    } else {
        build_update(&request.table, &request.fields, request.condition.as_ref())
    }
}

/// Check that a mutation can form a statement without building it.
pub(crate) fn validate_mutation(request: &MutationRequest) -> Result<(), SqlProxyError> {
    validate_table(&request.table)?;
    validate_names(request.fields.iter().map(|f| f.name.as_str()))
}
