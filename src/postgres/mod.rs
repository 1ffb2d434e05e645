// PostgreSQL backend for the proxy.
//
// - config: credentials -> tokio_postgres::Config
// - params: textual values -> typed bind parameters
// - query: row extraction into a ResultSet
// - connection: the DbConnection implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use connection::PostgresConnection;
pub use params::Params;
pub use query::build_result_set;
