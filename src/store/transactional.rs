//! Transactional
//!
//! Outermost writer of the chain: opens the unit of work, runs the inner
//! writer on it, then commits or rolls back.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{User, UserState};

use super::{StoreError, StoreResult, UnitOfWork, UserAdder, UserWriter};

/// Runs a [`UserWriter`] inside its own transaction
#[derive(Debug, Clone)]
pub struct Transactional<W> {
    pool: PgPool,
    inner: W,
}

impl<W> Transactional<W> {
    pub fn new(pool: PgPool, inner: W) -> Self {
        Self { pool, inner }
    }
}

#[async_trait]
impl<W: UserWriter> UserAdder for Transactional<W> {
    async fn add_user(&self, state: UserState) -> StoreResult<User> {
        let mut uow = UnitOfWork::begin(&self.pool)
            .await
            .map_err(|e| e.context("transactional: failed to start transaction"))?;

        // If this future is dropped before resolving `uow`, sqlx rolls the
        // transaction back when it is dropped.
        let outcome = self.inner.add(&mut uow, &state).await;

        match outcome {
            Ok(user) => {
                uow.commit()
                    .await
                    .map_err(|e| e.context("transactional: failed to commit"))?;
                tracing::debug!(user_id = %user.id, "Transaction committed");
                Ok(user)
            }
            Err(err) => Err(rolled_back(err, uow.rollback().await)),
        }
    }
}

/// Combine the error that aborted the unit with the rollback outcome
fn rolled_back(err: StoreError, rollback: StoreResult<()>) -> StoreError {
    match rollback {
        Ok(()) => {
            tracing::debug!(kind = ?err.kind(), "Transaction rolled back");
            err.context("transactional: failed to execute transaction")
        }
        Err(rollback) => {
            tracing::warn!(error = %rollback, "Rollback failed after aborted transaction");
            StoreError::RollbackFailed {
                source: Box::new(err.context("transactional: failed to execute transaction")),
                rollback: Box::new(rollback),
            }
        }
    }
}
