use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::DbConnection;
use crate::error::SqlProxyError;
use crate::query_builder::Statement;
use crate::results::ResultSet;
use crate::sqlite::params::Params;
use crate::translation::PlaceholderStyle;

use super::manager::SqliteWorker;

/// `SQLite` connection owned by a dedicated worker thread.
///
/// Reads and writes are both funnelled through that thread, so the one-writer/many-readers
/// contract of [`DbConnection`] holds without sharing the `rusqlite::Connection`.
#[derive(Clone)]
pub struct SqliteConnection {
    worker: Arc<SqliteWorker>,
    path: Arc<str>,
}

impl SqliteConnection {
    /// Open `path` (or `:memory:`) on a new worker thread.
    ///
    /// # Errors
    /// Returns [`SqlProxyError`] if the thread cannot be spawned or the database cannot be
    /// opened.
    pub async fn open(path: &str) -> Result<Self, SqlProxyError> {
        let worker = SqliteWorker::spawn(path).await?;
        Ok(Self {
            worker: Arc::new(worker),
            path: Arc::from(path),
        })
    }
}

#[async_trait]
impl DbConnection for SqliteConnection {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Sqlite
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, SqlProxyError> {
        let query = statement.sql_for(self.placeholder_style()).into_owned();
        let Params(params) = Params::convert(statement.params());
        self.worker.execute_dml(query, params).await
    }

    async fn query(&self, statement: &Statement) -> Result<ResultSet, SqlProxyError> {
        let query = statement.sql_for(self.placeholder_style()).into_owned();
        let Params(params) = Params::convert(statement.params());
        self.worker.execute_select(query, params).await
    }

    async fn close(&self) -> Result<(), SqlProxyError> {
        self.worker.shutdown();
        Ok(())
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .finish()
    }
}
