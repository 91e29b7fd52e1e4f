//! Unit of Work
//!
//! Carries one open transaction down the writer chain. It is created by
//! [`Transactional`](super::Transactional) and lent by `&mut` to every
//! nested writer, so a writer can only run while a transaction is open.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::{StoreError, StoreResult, TxOp};

/// An open database transaction owned by one `add_user` call
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

impl UnitOfWork {
    /// Begin a new transaction on the pool
    pub async fn begin(pool: &PgPool) -> StoreResult<Self> {
        let tx = pool.begin().await.map_err(|source| StoreError::Transaction {
            op: TxOp::Begin,
            source,
        })?;

        Ok(Self { tx })
    }

    /// The connection statements of this unit must run on
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(|source| StoreError::Transaction {
            op: TxOp::Commit,
            source,
        })
    }

    pub async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await.map_err(|source| StoreError::Transaction {
            op: TxOp::Rollback,
            source,
        })
    }
}
