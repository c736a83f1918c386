//! Core traits for sqlscan

mod db;
mod from_row;
mod from_value;
mod record;
mod to_value;
mod transaction;

pub use db::{Db, ExecResult};
pub use from_row::{expect_columns, FromRow, Row, RowExt, Rows, ValueRow, ValueRows};
pub use from_value::FromValue;
pub use record::{Field, Record};
pub use to_value::ToValue;
pub use transaction::{IsolationLevel, Transaction, Transactional};
