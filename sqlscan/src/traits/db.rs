//! Db trait for the database handle the orchestrator runs against

use crate::dialect::Dialect;
use crate::error::Result;
use crate::traits::Rows;
use crate::value::Value;
use async_trait::async_trait;

/// Result of a statement execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Number of rows affected by the statement
    pub rows_affected: u64,
    /// Identity generated by the statement (for INSERT), if the driver reports one
    pub last_insert_id: Option<u64>,
}

/// A database handle: a connection, a pool, or an open transaction.
///
/// The mapping layer treats the handle as an opaque capability set and never
/// inspects connection or transaction state. Everything it needs is the three
/// execution primitives and the dialect the handle speaks.
#[async_trait]
pub trait Db: Send + Sync {
    /// Cursor type returned by [`Db::query`].
    type Rows: Rows;

    /// SQL dialect used to render statements for this handle.
    ///
    /// Defaults to the process-wide dialect (see [`Dialect::install`]).
    fn dialect(&self) -> &Dialect {
        Dialect::global()
    }

    /// Execute a statement that returns no rows.
    async fn exec(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult>;

    /// Execute a query and return a cursor over its rows.
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Self::Rows>;

    /// Execute a query expected to return at most one row.
    ///
    /// `Ok(None)` means the query matched nothing.
    async fn query_row(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<<Self::Rows as Rows>::Row>> {
        let mut rows = self.query(sql, params).await?;
        rows.next_row()
    }
}

