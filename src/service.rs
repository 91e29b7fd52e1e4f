//! User Service
//!
//! Use cases exposed to the HTTP layer. Holds no transactional logic of its
//! own; the writer chain behind `adder` owns the unit of work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{HistoryEntry, User, UserState};
use crate::store::{
    HistoryLister, StoreResult, Transactional, UserAdder, UserHistory, UserRepository,
};

/// Façade over the user writer chain and the history reader
#[derive(Clone)]
pub struct UserService {
    adder: Arc<dyn UserAdder>,
    lister: Arc<dyn HistoryLister>,
}

impl UserService {
    pub fn new(adder: Arc<dyn UserAdder>, lister: Arc<dyn HistoryLister>) -> Self {
        Self { adder, lister }
    }

    /// Compose the PostgreSQL chain:
    /// `Transactional -> UserHistory -> UserRepository`
    pub fn postgres(pool: PgPool) -> Self {
        let history = UserHistory::new(pool.clone(), UserRepository::new());
        let transactional = Transactional::new(pool, history.clone());

        Self::new(Arc::new(transactional), Arc::new(history))
    }

    pub async fn add_user(&self, name: String, age: u8) -> StoreResult<User> {
        self.adder.add_user(UserState { name, age }).await
    }

    pub async fn list_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<HistoryEntry>> {
        self.lister.list(from, to).await
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}
