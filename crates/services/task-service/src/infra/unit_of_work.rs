//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all stores
//! - Manages database transactions (begin, commit, rollback)
//! - Hands out the cascade engine, which only exists inside a transaction

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;

use common::{AppError, AppResult};

use crate::cascade::CascadeEngine;
use crate::guard::UniquenessGuard;
use crate::repository::{CategoryStore, TaskStore, UserGroupStore, UserStore};

/// Unit of Work trait for dependency injection.
///
/// Reads outside a transaction go straight to the pool; every mutating
/// workflow runs through [`UnitOfWork::transaction`].
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn user_groups(&self) -> UserGroupStore<'_, DatabaseConnection>;

    fn users(&self) -> UserStore<'_, DatabaseConnection>;

    fn categories(&self) -> CategoryStore<'_, DatabaseConnection>;

    fn tasks(&self) -> TaskStore<'_, DatabaseConnection>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    /// Uses ReadCommitted isolation level by default.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send;
}

/// Transaction context providing store access within a transaction.
///
/// Everything obtained from the context shares the same database
/// transaction. The context borrows the transaction, so nothing can
/// outlive it.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn user_groups(&self) -> UserGroupStore<'a, DatabaseTransaction> {
        UserGroupStore::new(self.txn)
    }

    pub fn users(&self) -> UserStore<'a, DatabaseTransaction> {
        UserStore::new(self.txn)
    }

    pub fn categories(&self) -> CategoryStore<'a, DatabaseTransaction> {
        CategoryStore::new(self.txn)
    }

    pub fn tasks(&self) -> TaskStore<'a, DatabaseTransaction> {
        TaskStore::new(self.txn)
    }

    pub fn guard(&self) -> UniquenessGuard<'a, DatabaseTransaction> {
        UniquenessGuard::new(self.txn)
    }

    pub fn cascade(&self) -> CascadeEngine<'a> {
        CascadeEngine::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(|e| AppError::transaction(format!("begin: {}", e)))?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::transaction(format!("commit: {}", e)))?;
                Ok(result)
            }
            Err(e) => {
                // The body's error is what the caller sees
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn user_groups(&self) -> UserGroupStore<'_, DatabaseConnection> {
        UserGroupStore::new(&self.db)
    }

    fn users(&self) -> UserStore<'_, DatabaseConnection> {
        UserStore::new(&self.db)
    }

    fn categories(&self) -> CategoryStore<'_, DatabaseConnection> {
        CategoryStore::new(&self.db)
    }

    fn tasks(&self) -> TaskStore<'_, DatabaseConnection> {
        TaskStore::new(&self.db)
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }
}

/// Run a block inside `UnitOfWork::transaction`.
///
/// The block owns everything it captures, so clone values in before use.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
