//! Common test utilities
//!
//! Database tests run only when `DATABASE_URL` is set; otherwise they
//! print a notice and return early.
//!
//! Point `DATABASE_URL` at a dedicated, disposable database: the tests
//! delete rows (the fixed `dani` user) and add test-only constraints and
//! triggers to `users_history`.

#![allow(dead_code)]

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use user_history_api::UserId;

/// Name whose history insert is rejected by a test-only CHECK constraint
pub const POISONED_NAME_PREFIX: &str = "history-poison-";

/// Name whose history row is rejected by a deferred trigger at commit time
pub const COMMIT_POISONED_NAME_PREFIX: &str = "commit-poison-";

/// Connect to the test database and make sure the schema exists
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Serialize schema setup across concurrently running tests
    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("SELECT pg_advisory_xact_lock(7201)")
        .execute(&mut *tx)
        .await
        .expect("Failed to take schema lock");

    for statement in include_str!("../../migrations/0001_create_users.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.lines().all(|l| l.trim_start().starts_with("--")))
    {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .expect("Failed to apply schema");
    }

    // Lets tests force the history insert to fail after the user insert
    sqlx::query("ALTER TABLE users_history DROP CONSTRAINT IF EXISTS users_history_poison_check")
        .execute(&mut *tx)
        .await
        .expect("Failed to drop poison constraint");
    sqlx::query(&format!(
        "ALTER TABLE users_history ADD CONSTRAINT users_history_poison_check \
         CHECK (state->>'name' NOT LIKE '{}%')",
        POISONED_NAME_PREFIX
    ))
    .execute(&mut *tx)
    .await
    .expect("Failed to add poison constraint");

    // Lets tests force the commit itself to fail after both inserts succeeded
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION users_history_reject_at_commit() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'history entry for % rejected at commit', NEW.state->>'name';
        END
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&mut *tx)
    .await
    .expect("Failed to create commit poison function");
    sqlx::query("DROP TRIGGER IF EXISTS users_history_commit_poison ON users_history")
        .execute(&mut *tx)
        .await
        .expect("Failed to drop commit poison trigger");
    sqlx::query(&format!(
        "CREATE CONSTRAINT TRIGGER users_history_commit_poison \
         AFTER INSERT ON users_history \
         DEFERRABLE INITIALLY DEFERRED \
         FOR EACH ROW WHEN (NEW.state->>'name' LIKE '{}%') \
         EXECUTE FUNCTION users_history_reject_at_commit()",
        COMMIT_POISONED_NAME_PREFIX
    ))
    .execute(&mut *tx)
    .await
    .expect("Failed to add commit poison trigger");

    tx.commit().await.expect("Failed to commit schema");

    Some(pool)
}

/// Separate pool whose sessions carry `application_name`, so a test can
/// find them in `pg_stat_activity`
pub async fn connect_tagged(application_name: &str) -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let options = database_url
        .parse::<PgConnectOptions>()
        .expect("Invalid DATABASE_URL")
        .application_name(application_name);

    PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .expect("Failed to connect to DB")
}

/// Sessions of `application_name` sitting inside an open transaction
pub async fn count_idle_in_transaction(pool: &PgPool, application_name: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM pg_stat_activity \
         WHERE application_name = $1 AND state LIKE 'idle in transaction%'",
    )
    .bind(application_name)
    .fetch_one(pool)
    .await
    .expect("Failed to read pg_stat_activity")
}

/// A name no other test run will use
pub fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4())
}

pub async fn count_users_named(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to count users")
}

pub async fn count_history_named(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users_history WHERE state->>'name' = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to count history")
}

pub async fn history_user_ids(pool: &PgPool, user_id: UserId) -> Vec<i64> {
    sqlx::query_scalar("SELECT user_id FROM users_history WHERE user_id = $1")
        .bind(user_id.0)
        .fetch_all(pool)
        .await
        .expect("Failed to read history")
}
