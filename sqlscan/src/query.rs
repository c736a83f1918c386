//! Fluent builder for ad-hoc SQL

use std::borrow::Cow;

use crate::error::{Result, ResultExt};
use crate::scan::{scan_all, scan_one, scan_optional};
use crate::traits::{Db, ExecResult, FromRow, FromValue, ToValue};
use crate::value::Value;

/// Caller-written SQL with bound parameters.
///
/// Placeholders are written in the handle's dialect (`?` or `$n`); the
/// builder only collects values in order.
///
/// # Example
///
/// ```ignore
/// use sqlscan::Query;
///
/// let names: Vec<(String,)> = Query::new("SELECT name FROM users WHERE age > $1")
///     .bind(21)
///     .fetch_all(&db)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query<'q> {
    sql: Cow<'q, str>,
    params: Vec<Value>,
}

impl<'q> Query<'q> {
    /// Create a new query with the given SQL.
    pub fn new(sql: impl Into<Cow<'q, str>>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next parameter.
    pub fn bind<T: ToValue>(mut self, value: T) -> Self {
        self.params.push(value.to_value());
        self
    }

    /// Bind several parameters, e.g. for an IN list.
    pub fn bind_all<T: ToValue>(mut self, values: &[T]) -> Self {
        self.params.extend(values.iter().map(ToValue::to_value));
        self
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Execute a statement that returns no rows.
    pub async fn execute<D: Db + ?Sized>(self, db: &D) -> Result<ExecResult> {
        db.exec(&self.sql, self.params).await.context("exec")
    }

    /// Fetch all matching rows.
    pub async fn fetch_all<T: FromRow, D: Db + ?Sized>(self, db: &D) -> Result<Vec<T>> {
        let rows = db.query(&self.sql, self.params).await.context("query")?;
        let mut out = Vec::new();
        scan_all(rows, &mut out)?;
        Ok(out)
    }

    /// Fetch the first row, if any.
    pub async fn fetch_optional<T: FromRow, D: Db + ?Sized>(self, db: &D) -> Result<Option<T>> {
        let rows = db.query(&self.sql, self.params).await.context("query")?;
        scan_optional(rows)
    }

    /// Fetch the first row; a not-found error if there is none.
    pub async fn fetch_one<T: FromRow, D: Db + ?Sized>(self, db: &D) -> Result<T> {
        let rows = db.query(&self.sql, self.params).await.context("query")?;
        scan_one(rows)
    }

    /// Fetch the first column of the first row.
    pub async fn fetch_scalar<T: FromValue, D: Db + ?Sized>(self, db: &D) -> Result<T> {
        let (value,) = self.fetch_one::<(T,), D>(db).await?;
        Ok(value)
    }
}
