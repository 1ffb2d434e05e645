//! Write-serializing proxy in front of a SQL connection.
//!
//! Producers hand [`MutationRequest`]s to a [`SqlProxy`] and continue immediately; a single
//! background task applies them to the database one at a time, in submission order. Reads
//! ([`QueryRequest`]) run synchronously on the caller's task and come back as ordered
//! [`Record`]s.
//!
//! Submission is fire-and-forget: a failed write is logged through `tracing` and counted in
//! [`QueueStats`], but never reported to the task that submitted it.

pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod prelude;
pub mod proxy;
pub mod query_builder;
pub mod queue;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{Credentials, CredentialsBuilder, ProxyOptions, ProxyOptionsBuilder, ShutdownPolicy};
pub use connection::DbConnection;
pub use error::SqlProxyError;
pub use model::{FieldValue, MutationRequest, QueryRequest};
pub use proxy::SqlProxy;
pub use query_builder::Statement;
pub use queue::{QueueStats, WriteHandle};
pub use results::{CustomDbRow, Record, ResultSet};
pub use translation::PlaceholderStyle;
pub use types::{DatabaseType, RowValues};
