use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SqlProxyError;
use crate::types::DatabaseType;

/// Bounded queue size used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// What `close` does with mutations still waiting in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Execute every queued mutation, then stop the worker.
    #[default]
    Drain,
    /// Stop after the in-flight mutation; queued ones are dropped and counted.
    Discard,
}

/// Where and as whom to connect.
///
/// For `SQLite`, `database` is the file path (or `:memory:`) and the remaining fields are
/// ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub db_type: DatabaseType,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    pub database: String,
}

impl Credentials {
    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: 0,
            database: path.into(),
        }
    }

    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn postgres(
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        Self {
            db_type: DatabaseType::Postgres,
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port,
            database: database.into(),
        }
    }

    #[must_use]
    pub fn builder(db_type: DatabaseType) -> CredentialsBuilder {
        CredentialsBuilder::new(db_type)
    }

    /// Check the fields the selected backend needs.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::ConfigError`] naming the first missing field.
    pub fn validate(&self) -> Result<(), SqlProxyError> {
        if self.database.is_empty() {
            return Err(SqlProxyError::ConfigError("database is required".into()));
        }
        match self.db_type {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => {
                if self.host.is_empty() {
                    return Err(SqlProxyError::ConfigError("host is required".into()));
                }
                if self.port == 0 {
                    return Err(SqlProxyError::ConfigError("port is required".into()));
                }
                if self.user.is_empty() {
                    return Err(SqlProxyError::ConfigError("user is required".into()));
                }
                Ok(())
            }
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Ok(()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("db_type", &self.db_type)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Fluent builder for [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialsBuilder {
    creds: Credentials,
}

impl CredentialsBuilder {
    #[must_use]
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            creds: Credentials {
                db_type,
                user: String::new(),
                password: String::new(),
                host: String::new(),
                port: 0,
                database: String::new(),
            },
        }
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.creds.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.creds.password = password.into();
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.creds.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.creds.port = port;
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.creds.database = database.into();
        self
    }

    /// # Errors
    /// Returns [`SqlProxyError::ConfigError`] if a field the backend needs is missing.
    pub fn finish(self) -> Result<Credentials, SqlProxyError> {
        self.creds.validate()?;
        Ok(self.creds)
    }
}

/// Tuning for the write queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyOptions {
    pub queue_capacity: usize,
    #[serde(default)]
    pub shutdown: ShutdownPolicy,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown: ShutdownPolicy::default(),
        }
    }
}

impl ProxyOptions {
    #[must_use]
    pub fn builder() -> ProxyOptionsBuilder {
        ProxyOptionsBuilder::default()
    }

    /// # Errors
    /// Returns [`SqlProxyError::ConfigError`] when the queue capacity is zero.
    pub fn validate(&self) -> Result<(), SqlProxyError> {
        if self.queue_capacity == 0 {
            return Err(SqlProxyError::ConfigError(
                "queue_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`ProxyOptions`].
#[derive(Debug, Clone, Default)]
pub struct ProxyOptionsBuilder {
    opts: ProxyOptions,
}

impl ProxyOptionsBuilder {
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.opts.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn shutdown(mut self, policy: ShutdownPolicy) -> Self {
        self.opts.shutdown = policy;
        self
    }

    /// # Errors
    /// Returns [`SqlProxyError::ConfigError`] when the queue capacity is zero.
    pub fn finish(self) -> Result<ProxyOptions, SqlProxyError> {
        self.opts.validate()?;
        Ok(self.opts)
    }
}
