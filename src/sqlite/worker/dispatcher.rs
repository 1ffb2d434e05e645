use std::sync::mpsc::Receiver;
use std::time::Duration;

use rusqlite::types::Value;
use tracing::debug;

use crate::error::SqlProxyError;
use crate::results::ResultSet;
use crate::sqlite::query::build_result_set;

use super::channel::Command;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) fn open_connection(path: &str) -> Result<rusqlite::Connection, SqlProxyError> {
    let conn = rusqlite::Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    debug!(path, journal_mode = mode.as_str(), "sqlite connection opened");
    Ok(conn)
}

pub(super) fn run_sqlite_worker(conn: &rusqlite::Connection, receiver: &Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Shutdown => break,
            Command::ExecuteSelect {
                query,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(execute_select(conn, &query, &params));
            }
            Command::ExecuteDml {
                query,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(execute_dml(conn, &query, &params));
            }
        }
    }
    debug!("sqlite worker stopped");
}

fn execute_select(
    conn: &rusqlite::Connection,
    query: &str,
    params: &[Value],
) -> Result<ResultSet, SqlProxyError> {
    let mut stmt = conn.prepare(query)?;
    build_result_set(&mut stmt, params)
}

fn execute_dml(
    conn: &rusqlite::Connection,
    query: &str,
    params: &[Value],
) -> Result<usize, SqlProxyError> {
    let mut stmt = conn.prepare(query)?;
    Ok(stmt.execute(rusqlite::params_from_iter(params.iter()))?)
}
