use crate::error::SqlProxyError;
use crate::model::{FieldValue, QueryRequest};

use super::{Statement, validate_names, validate_table};

/// `SELECT <a>, <b>, ... FROM <table> [WHERE <cond> = ?1]`.
///
/// # Errors
/// Returns [`SqlProxyError::InvalidRequest`] for an empty table name, zero fields, or an empty
/// field name.
pub fn build_select<S: AsRef<str>>(
    table: &str,
    fields: &[S],
    condition: Option<&FieldValue>,
) -> Result<Statement, SqlProxyError> {
    validate_table(table)?;
    validate_names(fields.iter().map(AsRef::as_ref))?;

    let columns: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    let mut stmt = Statement::new(format!("SELECT {} FROM {table}", columns.join(", ")));
    stmt.push_condition(condition);
    Ok(stmt)
}

/// Build the statement for a read request.
///
/// # Errors
/// See [`build_select`].
pub fn build_query(request: &QueryRequest) -> Result<Statement, SqlProxyError> {
    build_select(&request.table, &request.fields, request.condition.as_ref())
}
