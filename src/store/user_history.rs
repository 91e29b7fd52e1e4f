//! User History
//!
//! Decorates a [`UserWriter`] so every created user gets a `wasCreated`
//! history row in the same unit of work, and serves history reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Action, HistoryEntry, User, UserId, UserState};

use super::{HistoryLister, StoreError, StoreResult, UnitOfWork, UserWriter};

type HistoryRow = (i64, i64, String, serde_json::Value, DateTime<Utc>);

/// History-appending writer for the `users_history` table
#[derive(Debug, Clone)]
pub struct UserHistory<W> {
    pool: PgPool,
    inner: W,
}

impl<W> UserHistory<W> {
    /// Wrap `inner`; `pool` is used only for reads
    pub fn new(pool: PgPool, inner: W) -> Self {
        Self { pool, inner }
    }
}

#[async_trait]
impl<W: UserWriter> UserWriter for UserHistory<W> {
    async fn add(&self, uow: &mut UnitOfWork, state: &UserState) -> StoreResult<User> {
        let user = self.inner.add(uow, state).await?;

        let snapshot = serde_json::to_value(&user.state)
            .map_err(|e| StoreError::from(e).context("user history: failed to encode user state"))?;

        sqlx::query(
            r#"
            INSERT INTO users_history (user_id, action, state)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id.0)
        .bind(Action::WasCreated.as_str())
        .bind(&snapshot)
        .execute(uow.connection())
        .await
        .map_err(|e| StoreError::database("user history: failed to append to history", e))?;

        tracing::debug!(
            user_id = %user.id,
            action = Action::WasCreated.as_str(),
            "History entry appended"
        );

        Ok(user)
    }
}

#[async_trait]
impl<W: Send + Sync> HistoryLister for UserHistory<W> {
    async fn list(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<HistoryEntry>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT user_history_id, user_id, action, state, created_at
            FROM users_history
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at DESC, user_history_id DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database("user history: failed to list history", e))?;

        rows.into_iter().map(entry_from_row).collect()
    }
}

fn entry_from_row((id, user_id, action, state, created_at): HistoryRow) -> StoreResult<HistoryEntry> {
    let action = Action::parse(&action).ok_or_else(|| {
        StoreError::InvalidRow(format!("history entry {} has unknown action {:?}", id, action))
    })?;

    Ok(HistoryEntry {
        id,
        user_id: UserId(user_id),
        action,
        state,
        created_at,
    })
}
