//! sqlscan - record-to-SQL mapping
//!
//! Maps plain Rust structs onto single-table CRUD statements and decodes
//! result rows back into them, over any database handle implementing
//! [`Db`].
//!
//! # Features
//!
//! - **Derive Macros**: `#[derive(Record)]` describes a struct's columns and
//!   primary key; `#[derive(FromRow)]` decodes rows positionally
//! - **CRUD**: [`load`], [`insert`], [`update`], [`save`] with
//!   dialect-correct quoting, placeholders and key retrieval
//! - **Raw Queries**: [`query_row`], [`query_all`] and the fluent [`Query`]
//!   builder scan into records, projections or tuples
//! - **Dialects**: PostgreSQL (`"x"`, `$n`, `RETURNING`), MySQL (`` `x` ``,
//!   `?`, last-insert id) and SQLite, or any combination
//!
//! # Example
//!
//! ```ignore
//! use sqlscan::{FromRow, MySqlPool, Record};
//!
//! #[derive(Debug, Default, FromRow, Record)]
//! pub struct User {
//!     #[sqlscan(pk)]
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! async fn rename(pool: &MySqlPool, id: i64) -> sqlscan::Result<()> {
//!     let mut user = User::default();
//!     sqlscan::load(pool, "users", id, &mut user).await?;
//!     user.name.push_str(" (renamed)");
//!     sqlscan::update(pool, "users", &user).await
//! }
//! ```

extern crate self as sqlscan;

pub mod config;
pub mod crud;
pub mod dialect;
pub mod error;
pub mod fragment;
pub mod meta;
pub mod mysql;
pub mod query;
pub mod scan;
pub mod traits;
pub mod value;

// Re-export the derive macros
pub use sqlscan_derive::{FromRow, Record};

// Re-export main types
pub use config::Settings;
pub use crud::{insert, load, query_all, query_row, save, update};
pub use dialect::{Dialect, DialectKind, EmptyInsert, KeyRetrieval, PlaceholderStyle};
pub use error::{Error, ErrorKind, Result};
pub use meta::RecordMeta;
pub use mysql::{MySqlPool, MySqlPoolBuilder, MySqlRows, MySqlTransaction};
pub use query::Query;
pub use scan::{scan_all, scan_one, scan_optional, scan_row};
pub use traits::{
    Db, ExecResult, Field, FromRow, FromValue, IsolationLevel, Record, Row, RowExt, Rows, ToValue,
    Transaction, Transactional, ValueRow, ValueRows,
};
pub use value::Value;

/// Build a parameter list from expressions implementing [`ToValue`].
///
/// ```ignore
/// let mut users: Vec<User> = Vec::new();
/// sqlscan::query_all(&db, &mut users, "SELECT * FROM users WHERE age > $1", params![21]).await?;
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToValue::to_value(&$value)),+]
    };
}
