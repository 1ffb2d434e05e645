use std::collections::HashMap;

use super::result_set::ResultSet;
use crate::error::SqlProxyError;
use crate::types::RowValues;

/// One materialized row: field name -> textual value, in requested field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set `name` to `value`. A repeated name overwrites the earlier value in place and
    /// returns it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries.into_iter().collect()
    }
}

impl IntoIterator for Record {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<Record> for HashMap<String, String> {
    fn from(record: Record) -> Self {
        record.into_map()
    }
}

/// Turn a result set into one [`Record`] per row, preserving row order.
///
/// Column `i` of every row feeds `fields[i]`; the SELECT built for a [`QueryRequest`]
/// lists its fields in that order. A missing column, a `NULL`, or a non-UTF-8 blob fails the
/// whole read.
///
/// # Errors
/// Returns [`SqlProxyError::ScanError`] naming the first row and column that could not be
/// scanned as text.
///
/// [`QueryRequest`]: crate::QueryRequest
pub fn materialize<S: AsRef<str>>(
    fields: &[S],
    result_set: &ResultSet,
) -> Result<Vec<Record>, SqlProxyError> {
    let mut records = Vec::with_capacity(result_set.len());
    for (row_idx, row) in result_set.results.iter().enumerate() {
        let mut record = Record::with_capacity(fields.len());
        for (col_idx, field) in fields.iter().enumerate() {
            let field = field.as_ref();
            let value = row.get_by_index(col_idx).ok_or_else(|| SqlProxyError::ScanError {
                row: row_idx,
                column: field.to_string(),
                reason: format!("row has only {} columns", row.rows.len()),
            })?;
            let text = value.to_text().ok_or_else(|| SqlProxyError::ScanError {
                row: row_idx,
                column: field.to_string(),
                reason: unscannable_reason(value).into(),
            })?;
            record.insert(field, text);
        }
        records.push(record);
    }
    Ok(records)
}

fn unscannable_reason(value: &RowValues) -> &'static str {
    match value {
        RowValues::Null => "NULL cannot be scanned into text",
        RowValues::Blob(_) => "blob is not valid UTF-8",
        _ => "value has no text form",
    }
}
