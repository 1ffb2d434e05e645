use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::Type;
use tokio_postgres::{Row, Statement};

use crate::error::SqlProxyError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set from the rows a prepared statement returned.
///
/// # Errors
/// Returns errors from value extraction.
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, SqlProxyError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(postgres_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `SqlProxyError` if the column cannot be decoded.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, SqlProxyError> {
    let type_info = row.columns()[idx].type_();

    let value = if *type_info == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?
            .map(|v| RowValues::Int(i64::from(v)))
    } else if *type_info == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?
            .map(|v| RowValues::Int(i64::from(v)))
    } else if *type_info == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(RowValues::Int)
    } else if *type_info == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .map(|v| RowValues::Float(f64::from(v)))
    } else if *type_info == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(RowValues::Float)
    } else if *type_info == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(RowValues::Bool)
    } else if *type_info == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| RowValues::Text(v.to_string()))
    } else if *type_info == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| RowValues::Text(v.to_string()))
    } else if *type_info == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| RowValues::Text(v.to_rfc3339()))
    } else if *type_info == Type::JSON || *type_info == Type::JSONB {
        row.try_get::<_, Option<serde_json::Value>>(idx)?
            .map(|v| RowValues::Text(v.to_string()))
    } else if *type_info == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(idx)?.map(RowValues::Blob)
    } else {
        // text, varchar, bpchar, name and anything else the driver can read as a string
        row.try_get::<_, Option<String>>(idx)?.map(RowValues::Text)
    };

    Ok(value.unwrap_or(RowValues::Null))
}
