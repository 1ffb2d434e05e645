use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::SqlProxyError;
use crate::query_builder::Statement;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;
use crate::types::DatabaseType;

/// The database capability the proxy drives.
///
/// The write worker is the only caller of [`execute`](DbConnection::execute); reads call
/// [`query`](DbConnection::query) from the requesting task, so implementations must tolerate
/// one writer and many readers at once. A backend that cannot should serialize internally
/// (the built-in `SQLite` connection funnels everything through one thread).
#[async_trait]
pub trait DbConnection: Send + Sync {
    /// Placeholder syntax this backend binds parameters with.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Run a statement that returns no rows; yields the affected row count.
    async fn execute(&self, statement: &Statement) -> Result<usize, SqlProxyError>;

    /// Run a query and return every row it produced, in cursor order.
    async fn query(&self, statement: &Statement) -> Result<ResultSet, SqlProxyError>;

    /// Release the underlying handle. Called once, after the write worker has stopped.
    async fn close(&self) -> Result<(), SqlProxyError> {
        Ok(())
    }
}

/// Open one of the built-in backends.
///
/// # Errors
/// Returns [`SqlProxyError::ConfigError`] for incomplete credentials and
/// [`SqlProxyError::ConnectionError`] (or the driver's own error) when the database cannot be
/// reached.
pub async fn open(credentials: &Credentials) -> Result<Arc<dyn DbConnection>, SqlProxyError> {
    credentials.validate()?;
    match credentials.db_type {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => {
            let conn = crate::sqlite::SqliteConnection::open(&credentials.database).await?;
            Ok(Arc::new(conn))
        }
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => {
            let conn = crate::postgres::PostgresConnection::connect(credentials).await?;
            Ok(Arc::new(conn))
        }
    }
}
