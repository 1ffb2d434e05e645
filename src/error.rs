use thiserror::Error;

/// Every failure the proxy reports.
///
/// Lifecycle and read errors come back to the immediate caller. Errors raised while the
/// background worker executes a queued mutation never reach the submitter; they are logged
/// and counted in [`QueueStats`](crate::QueueStats) instead.
#[derive(Debug, Error)]
pub enum SqlProxyError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("connection not established")]
    NotConnected,

    #[error("connection already established")]
    AlreadyConnected,

    #[error("connection already closed")]
    AlreadyDisconnected,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to scan row {row}, column {column}: {reason}")]
    ScanError {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("write queue is full")]
    QueueFull,
}
