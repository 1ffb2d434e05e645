mod materialize;
mod result_set;
mod row;

pub use materialize::{Record, materialize};
pub use result_set::ResultSet;
pub use row::CustomDbRow;
