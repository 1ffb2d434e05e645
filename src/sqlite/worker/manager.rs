use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use rusqlite::types::Value;
use tokio::sync::oneshot;

use crate::error::SqlProxyError;
use crate::results::ResultSet;

use super::channel::Command;
use super::dispatcher::{open_connection, run_sqlite_worker};

pub(super) struct SqliteWorker {
    sender: Sender<Command>,
    // Set once Shutdown has been sent; later requests fail without reaching the thread.
    closed: AtomicBool,
}

impl SqliteWorker {
    /// Start the worker thread and wait until it has opened `path`.
    pub(super) async fn spawn(path: &str) -> Result<Self, SqlProxyError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), SqlProxyError>>();
        let path = path.to_owned();
        thread::Builder::new()
            .name("sqlite-proxy-worker".into())
            .spawn(move || match open_connection(&path) {
                Ok(conn) => {
                    let _ = ready_tx.send(Ok(()));
                    run_sqlite_worker(&conn, &receiver);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .map_err(|err| {
                SqlProxyError::ConnectionError(format!(
                    "failed to spawn SQLite worker thread: {err}"
                ))
            })?;

        ready_rx
            .await
            .map_err(|_| connection_error("SQLite worker exited before opening the database"))??;
        Ok(Self {
            sender,
            closed: AtomicBool::new(false),
        })
    }

    fn send_command(&self, command: Command) -> Result<(), SqlProxyError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(connection_error("SQLite worker closed"));
        }
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, SqlProxyError>>) -> Command,
        drop_message: &'static str,
    ) -> Result<T, SqlProxyError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| connection_error(drop_message))?
    }

    pub(super) async fn execute_select(
        &self,
        query: String,
        params: Vec<Value>,
    ) -> Result<ResultSet, SqlProxyError> {
        self.request(
            |respond_to| Command::ExecuteSelect {
                query,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing select",
        )
        .await
    }

    pub(super) async fn execute_dml(
        &self,
        query: String,
        params: Vec<Value>,
    ) -> Result<usize, SqlProxyError> {
        self.request(
            |respond_to| Command::ExecuteDml {
                query,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing dml",
        )
        .await
    }

    /// Ask the thread to stop; commands already queued ahead of this still run.
    ///
    /// Only the first call sends `Shutdown`; `Drop` after an explicit close is a no-op.
    pub(super) fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.sender.send(Command::Shutdown);
    }
}

impl Drop for SqliteWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn connection_error(message: &str) -> SqlProxyError {
    SqlProxyError::ConnectionError(message.into())
}
