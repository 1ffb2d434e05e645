use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Values decoded from a database row.
///
/// Backends map their native column types onto this enum so the result materializer can
/// work without knowing which driver produced the row:
/// ```rust
/// use sql_proxy::prelude::*;
///
/// let values = vec![RowValues::Int(7), RowValues::Text("alice".into())];
/// assert_eq!(values[0].to_text().as_deref(), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// NULL value
    Null,
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Textual form of the value, as a string column scan would produce it.
    ///
    /// Returns `None` for `NULL` and for blobs that are not valid UTF-8.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            RowValues::Null => None,
            RowValues::Blob(bytes) => String::from_utf8(bytes.clone()).ok(),
        }
    }
}

/// The database backends the proxy can open on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `PostgreSQL` database
    #[cfg(feature = "postgres")]
    Postgres,
    /// `SQLite` database
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => f.write_str("postgres"),
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => f.write_str("sqlite"),
        }
    }
}
