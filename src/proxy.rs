use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::config::{Credentials, ProxyOptions};
use crate::connection::{self, DbConnection};
use crate::error::SqlProxyError;
use crate::model::{MutationRequest, QueryRequest};
use crate::query_builder::build_query;
use crate::queue::{QueueStats, StatsCounters, WriteHandle, WriteQueue};
use crate::results::{Record, materialize};

enum ProxyState {
    Disconnected,
    Connected(Session),
}

/// Everything that exists only between `connect` and `close`.
struct Session {
    conn: Arc<dyn DbConnection>,
    queue: WriteQueue,
}

/// Write-serializing proxy in front of one database connection.
///
/// Mutations go through [`submit`](Self::submit) into a bounded FIFO queue drained by a
/// single background task, so writes against the connection happen one at a time in
/// submission order. Reads go through [`query`](Self::query) and run on the caller's task.
///
/// ```rust,no_run
/// # use sql_proxy::prelude::*;
/// # async fn demo() -> Result<(), SqlProxyError> {
/// let proxy = SqlProxy::new();
/// proxy.connect(&Credentials::sqlite("app.db")).await?;
///
/// proxy
///     .submit(MutationRequest::insert(
///         "players",
///         vec![FieldValue::new("id", "7"), FieldValue::new("name", "ada")],
///     ))
///     .await?;
///
/// let rows = proxy
///     .query(&QueryRequest::new("players", ["name"]).with_condition("id", "7"))
///     .await?;
/// # let _ = rows;
/// proxy.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SqlProxy {
    options: ProxyOptions,
    // Serializes connect/close so the state never changes under an in-progress transition.
    lifecycle: tokio::sync::Mutex<()>,
    state: RwLock<ProxyState>,
    stats: Arc<StatsCounters>,
}

impl Default for SqlProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlProxy {
    /// A disconnected proxy with [`ProxyOptions::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: ProxyOptions::default(),
            lifecycle: tokio::sync::Mutex::new(()),
            state: RwLock::new(ProxyState::Disconnected),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// A disconnected proxy with custom queue options.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::ConfigError`] for invalid options.
    pub fn with_options(options: ProxyOptions) -> Result<Self, SqlProxyError> {
        options.validate()?;
        Ok(Self {
            options,
            lifecycle: tokio::sync::Mutex::new(()),
            state: RwLock::new(ProxyState::Disconnected),
            stats: Arc::new(StatsCounters::default()),
        })
    }

    #[must_use]
    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }

    /// Open a built-in backend and start the write worker.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::AlreadyConnected`] if a connection is open, otherwise any error
    /// from opening the backend.
    pub async fn connect(&self, credentials: &Credentials) -> Result<(), SqlProxyError> {
        let _transition = self.lifecycle.lock().await;
        if self.is_connected() {
            return Err(SqlProxyError::AlreadyConnected);
        }
        let conn = connection::open(credentials).await?;
        self.attach(conn);
        info!(
            db_type = %credentials.db_type,
            database = credentials.database.as_str(),
            "sql proxy connected"
        );
        Ok(())
    }

    /// Start the write worker on a connection the caller already opened.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::AlreadyConnected`] if a connection is open.
    pub async fn connect_with(&self, conn: Arc<dyn DbConnection>) -> Result<(), SqlProxyError> {
        let _transition = self.lifecycle.lock().await;
        if self.is_connected() {
            return Err(SqlProxyError::AlreadyConnected);
        }
        self.attach(conn);
        info!("sql proxy connected to caller-supplied connection");
        Ok(())
    }

    fn attach(&self, conn: Arc<dyn DbConnection>) {
        let queue = WriteQueue::start(Arc::clone(&conn), &self.options, Arc::clone(&self.stats));
        *self.write_state() = ProxyState::Connected(Session { conn, queue });
    }

    /// Stop the write worker, then close the connection.
    ///
    /// From the moment `close` starts, new submissions and reads fail with
    /// [`SqlProxyError::NotConnected`]. Mutations already queued are executed or dropped
    /// according to [`ProxyOptions::shutdown`]; `close` returns once the worker has exited
    /// and the connection is closed.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::AlreadyDisconnected`] if no connection is open, or the error
    /// raised while stopping the worker or closing the connection.
    pub async fn close(&self) -> Result<(), SqlProxyError> {
        let _transition = self.lifecycle.lock().await;
        let Session { conn, queue } = {
            let mut state = self.write_state();
            match std::mem::replace(&mut *state, ProxyState::Disconnected) {
                // Signalled under the lock: once anyone sees the proxy disconnected, the
                // worker has already been told to stop.
                ProxyState::Connected(session) => {
                    session.queue.cancel();
                    session
                }
                ProxyState::Disconnected => return Err(SqlProxyError::AlreadyDisconnected),
            }
        };

        let stopped = queue.stop().await;
        let closed = conn.close().await;
        let stats = self.stats();
        info!(
            executed = stats.executed,
            failed = stats.failed,
            discarded = stats.discarded,
            "sql proxy closed"
        );
        stopped.and(closed)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(*self.read_state(), ProxyState::Connected(_))
    }

    /// A producer handle that can be cloned and moved to other tasks.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::NotConnected`] when disconnected.
    pub fn write_handle(&self) -> Result<WriteHandle, SqlProxyError> {
        match &*self.read_state() {
            ProxyState::Connected(session) => Ok(session.queue.handle().clone()),
            ProxyState::Disconnected => Err(SqlProxyError::NotConnected),
        }
    }

    /// Queue a mutation for the background writer, waiting while the queue is full.
    ///
    /// Returning `Ok` means the mutation was accepted, not that it was written; execution
    /// errors are only logged.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::NotConnected`] when disconnected (or if the proxy closes while
    /// waiting for space) and [`SqlProxyError::InvalidRequest`] for a malformed mutation.
    pub async fn submit(&self, request: MutationRequest) -> Result<(), SqlProxyError> {
        let handle = self.write_handle()?;
        handle.submit(request).await
    }

    /// Queue a mutation only if a slot is free right now.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::QueueFull`] when the queue is full, plus the errors of
    /// [`submit`](Self::submit).
    pub fn try_submit(&self, request: MutationRequest) -> Result<(), SqlProxyError> {
        self.write_handle()?.try_submit(request)
    }

    /// Read rows directly from the connection.
    ///
    /// There is no read-your-writes guarantee: mutations still in the queue are not visible.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::NotConnected`] when disconnected,
    /// [`SqlProxyError::InvalidRequest`] for a malformed request, the backend's error if the
    /// query fails, or [`SqlProxyError::ScanError`] if any row cannot be read as text.
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<Record>, SqlProxyError> {
        let conn = self.connection()?;
        let statement = build_query(request)?;
        debug!(statement = %statement, "executing query");
        let result_set = conn.query(&statement).await?;
        materialize(&request.fields, &result_set)
    }

    /// Counters kept by the write worker across every connection this proxy has had.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }

    fn connection(&self) -> Result<Arc<dyn DbConnection>, SqlProxyError> {
        match &*self.read_state() {
            ProxyState::Connected(session) => Ok(Arc::clone(&session.conn)),
            ProxyState::Disconnected => Err(SqlProxyError::NotConnected),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ProxyState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ProxyState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for SqlProxy {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let ProxyState::Connected(session) = state {
            warn!("sql proxy dropped while connected; stopping write worker without waiting");
            session.queue.cancel();
        }
    }
}
