// SQLite backend for the proxy.
//
// - params: bound value conversion
// - query: row extraction into a ResultSet
// - worker: the thread that owns the rusqlite connection

pub mod params;
pub mod query;
pub mod worker;

pub use rusqlite;

pub use query::build_result_set;
pub use worker::SqliteConnection;
