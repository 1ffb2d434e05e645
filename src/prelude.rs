//! Convenient imports for common functionality.
//!
//! This module re-exports the types most callers need to connect, submit, and query.

pub use crate::config::{Credentials, ProxyOptions, ShutdownPolicy};
pub use crate::connection::DbConnection;
pub use crate::error::SqlProxyError;
pub use crate::model::{FieldValue, MutationRequest, QueryRequest};
pub use crate::proxy::SqlProxy;
pub use crate::query_builder::{Statement, build_insert, build_select, build_update};
pub use crate::queue::{QueueStats, WriteHandle};
pub use crate::results::{CustomDbRow, Record, ResultSet, materialize};
pub use crate::translation::PlaceholderStyle;
pub use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresConnection;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteConnection;
