//! User Repository
//!
//! Inserts the user row. Must run inside a unit of work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserId, UserState};

use super::{StoreError, StoreResult, UnitOfWork, UserWriter};

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Base writer for the `users` table
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserWriter for UserRepository {
    async fn add(&self, uow: &mut UnitOfWork, state: &UserState) -> StoreResult<User> {
        let row: (i64, String, i16, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO users (name, age)
            VALUES ($1, $2)
            RETURNING user_id, name, age, created_at, updated_at
            "#,
        )
        .bind(&state.name)
        .bind(i16::from(state.age))
        .fetch_one(uow.connection())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists(e).context("user repository: failed to insert user")
            } else {
                StoreError::database("user repository: failed to insert user", e)
            }
        })?;

        user_from_row(row)
    }
}

/// Check whether a driver error is a duplicate key violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

fn user_from_row(
    (id, name, age, created_at, updated_at): (i64, String, i16, DateTime<Utc>, DateTime<Utc>),
) -> StoreResult<User> {
    let age = u8::try_from(age)
        .map_err(|_| StoreError::InvalidRow(format!("user {} has age {} out of range", id, age)))?;

    Ok(User {
        id: UserId(id),
        created_at,
        updated_at,
        state: UserState { name, age },
    })
}
