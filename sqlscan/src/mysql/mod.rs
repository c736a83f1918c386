//! MySQL handles for sqlscan, backed by mysql_async

mod pool;
mod row;
mod transaction;
mod types;

pub use pool::{MySqlPool, MySqlPoolBuilder};
pub use row::MySqlRows;
pub use transaction::MySqlTransaction;
