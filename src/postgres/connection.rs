use std::sync::Mutex;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use crate::config::Credentials;
use crate::connection::DbConnection;
use crate::error::SqlProxyError;
use crate::query_builder::Statement;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;

use super::config::pg_config;
use super::params::Params;
use super::query::build_result_set;

/// A single `tokio_postgres` client plus its spawned connection driver.
///
/// `tokio_postgres::Client` pipelines concurrent requests, so the write worker and readers
/// share it directly.
pub struct PostgresConnection {
    client: Client,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl PostgresConnection {
    /// Connect with the given credentials.
    ///
    /// # Errors
    /// Returns `SqlProxyError::ConfigError` for incomplete credentials or
    /// `SqlProxyError::ConnectionError` if the server cannot be reached.
    pub async fn connect(credentials: &Credentials) -> Result<Self, SqlProxyError> {
        let cfg = pg_config(credentials)?;
        debug!(
            host = credentials.host.as_str(),
            port = credentials.port,
            db = credentials.database.as_str(),
            user = credentials.user.as_str(),
            "postgres connect start"
        );
        let (client, connection) = cfg.connect(NoTls).await.map_err(|e| {
            SqlProxyError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
        })?;
        let driver = tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection driver failed");
            }
        });
        debug!("postgres connect established");
        Ok(Self {
            client,
            driver: Mutex::new(Some(driver)),
        })
    }
}

#[async_trait]
impl DbConnection for PostgresConnection {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Postgres
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, SqlProxyError> {
        let sql = statement.sql_for(self.placeholder_style());
        let prepared = self.client.prepare(&sql).await?;
        let params = Params::convert(prepared.params(), statement.params())?;
        let rows = self.client.execute(&prepared, &params.as_refs()).await?;
        usize::try_from(rows).map_err(|_| {
            SqlProxyError::ExecutionError(format!("affected row count {rows} overflows usize"))
        })
    }

    async fn query(&self, statement: &Statement) -> Result<ResultSet, SqlProxyError> {
        let sql = statement.sql_for(self.placeholder_style());
        let prepared = self.client.prepare(&sql).await?;
        let params = Params::convert(prepared.params(), statement.params())?;
        let rows = self.client.query(&prepared, &params.as_refs()).await?;
        build_result_set(&prepared, &rows)
    }

    async fn close(&self) -> Result<(), SqlProxyError> {
        let driver = match self.driver.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(driver) = driver {
            driver.abort();
        }
        Ok(())
    }
}
