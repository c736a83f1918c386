//! Transaction traits for sqlscan handles

use crate::error::Result;
use crate::traits::Db;
use std::future::Future;
use std::pin::Pin;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    /// The default for most servers, and for sqlscan transactions.
    #[default]
    RepeatableRead,
    Serializable,
}

/// An open transaction.
///
/// A transaction is itself a [`Db`], so `load`, `insert`, `update`, `save`
/// and the raw query functions run inside it unchanged.
///
/// ```ignore
/// let tx = pool.begin().await?;
/// sqlscan::insert(&tx, "users", &mut user).await?;
/// sqlscan::update(&tx, "accounts", &account).await?;
/// tx.commit().await?;
/// ```
pub trait Transaction: Db {
    /// Commit, making all changes permanent. The transaction cannot be used afterwards.
    fn commit(&self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back, discarding all changes. The transaction cannot be used afterwards.
    fn rollback(&self) -> impl Future<Output = Result<()>> + Send;
}

/// A handle that can open transactions.
pub trait Transactional: Db {
    /// The transaction type for this handle.
    type Tx: Transaction + Send + Sync;

    /// Begin a new transaction with the default isolation level.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;

    /// Begin a new transaction with the specified isolation level.
    fn begin_with(&self, level: IsolationLevel) -> impl Future<Output = Result<Self::Tx>> + Send;

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`.
    ///
    /// ```ignore
    /// let id = pool.in_transaction(|tx| Box::pin(async move {
    ///     let mut user = User { id: 0, name: "ann".into() };
    ///     sqlscan::insert(tx, "users", &mut user).await?;
    ///     Ok(user.id)
    /// })).await?;
    /// ```
    fn in_transaction<R, F>(&self, f: F) -> impl Future<Output = Result<R>> + Send
    where
        R: Send,
        F: for<'a> FnOnce(&'a Self::Tx) -> Pin<Box<dyn Future<Output = Result<R>> + Send + 'a>>
            + Send;
}
