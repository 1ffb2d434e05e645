use rusqlite::types::Value;
use tokio::sync::oneshot;

use crate::error::SqlProxyError;
use crate::results::ResultSet;

pub(super) enum Command {
    ExecuteSelect {
        query: String,
        params: Vec<Value>,
        respond_to: oneshot::Sender<Result<ResultSet, SqlProxyError>>,
    },
    ExecuteDml {
        query: String,
        params: Vec<Value>,
        respond_to: oneshot::Sender<Result<usize, SqlProxyError>>,
    },
    Shutdown,
}
