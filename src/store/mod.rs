//! Store module
//!
//! Persistence layer for users and their history, built as a chain of
//! writers that all implement [`UserWriter`]:
//!
//! ```text
//! Transactional -> UserHistory -> UserRepository
//! ```
//!
//! [`Transactional`] opens the [`UnitOfWork`] that every inner writer
//! runs on and decides between commit and rollback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{HistoryEntry, User, UserState};

mod error;
mod transactional;
mod unit_of_work;
mod user_history;
mod user_repository;

pub use error::{ErrorKind, StoreError, StoreResult, TxOp};
pub use transactional::Transactional;
pub use unit_of_work::UnitOfWork;
pub use user_history::UserHistory;
pub use user_repository::UserRepository;

/// Adds a user inside an already open unit of work
#[async_trait]
pub trait UserWriter: Send + Sync {
    async fn add(&self, uow: &mut UnitOfWork, state: &UserState) -> StoreResult<User>;
}

/// Adds a user as one self-contained atomic operation
#[async_trait]
pub trait UserAdder: Send + Sync {
    async fn add_user(&self, state: UserState) -> StoreResult<User>;
}

/// Reads history entries created in `[from, to)`, newest first
#[async_trait]
pub trait HistoryLister: Send + Sync {
    async fn list(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<HistoryEntry>>;
}
