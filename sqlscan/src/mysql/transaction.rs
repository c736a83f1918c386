//! MySQL transaction handle

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::traits::{Db, ExecResult, IsolationLevel, Transaction};
use crate::value::Value;
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::Row as MySqlAsyncRow;
use tokio::sync::Mutex;

use super::row::MySqlRows;
use super::types::to_mysql_value;

/// An open MySQL transaction.
///
/// Implements [`Db`], so every sqlscan operation runs inside it, and
/// [`Transaction`] for commit and rollback.
///
/// # Example
///
/// ```ignore
/// let tx = pool.begin().await?;
/// sqlscan::insert(&tx, "users", &mut user).await?;
/// sqlscan::update(&tx, "orders", &order).await?;
/// tx.commit().await?;
/// ```
pub struct MySqlTransaction {
    // mysql_async needs &mut for statements; the lock is uncontended since a
    // transaction is driven by a single task.
    inner: Mutex<Option<mysql_async::Transaction<'static>>>,
    dialect: Dialect,
}

impl MySqlTransaction {
    pub(crate) fn new(tx: mysql_async::Transaction<'static>, dialect: Dialect) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
            dialect,
        }
    }

    async fn take_inner(&self) -> Result<mysql_async::Transaction<'static>> {
        self.inner.lock().await.take().ok_or_else(consumed)
    }
}

fn consumed() -> Error {
    Error::Validation("transaction already committed or rolled back".to_string())
}

#[async_trait]
impl Db for MySqlTransaction {
    type Rows = MySqlRows;

    fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    async fn exec(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        let mysql_params: Vec<mysql_async::Value> = params.iter().map(to_mysql_value).collect();

        tx.exec_drop(sql, mysql_params).await?;

        Ok(ExecResult {
            rows_affected: tx.affected_rows(),
            last_insert_id: tx.last_insert_id(),
        })
    }

    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<MySqlRows> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        let mysql_params: Vec<mysql_async::Value> = params.iter().map(to_mysql_value).collect();

        let rows: Vec<MySqlAsyncRow> = tx.exec(sql, mysql_params).await?;
        Ok(MySqlRows::new(rows))
    }
}

impl Transaction for MySqlTransaction {
    async fn commit(&self) -> Result<()> {
        let tx = self.take_inner().await?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let tx = self.take_inner().await?;
        tx.rollback().await?;
        Ok(())
    }
}

pub(crate) fn to_mysql_isolation(level: IsolationLevel) -> mysql_async::IsolationLevel {
    match level {
        IsolationLevel::ReadUncommitted => mysql_async::IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted => mysql_async::IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead => mysql_async::IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable => mysql_async::IsolationLevel::Serializable,
    }
}
