//! Load Testing Tool
//!
//! Creates users concurrently through the full transactional chain, then
//! checks that every user got exactly one history entry.
//!
//! Run with: cargo run --bin load_test --release -- --users 1000 --concurrency 16

use std::time::Instant;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinSet;

use user_history_api::store::StoreResult;
use user_history_api::{Config, User, UserService};

fn arg(args: &[String], flag: &str, default: u64) -> u64 {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Outcome counts for one run
#[derive(Debug, Default, PartialEq)]
struct Tally {
    success: u64,
    conflict: u64,
    failed: u64,
}

impl Tally {
    fn record(&mut self, result: StoreResult<User>) {
        match result {
            Ok(_) => self.success += 1,
            Err(e) if e.is_already_exists() => self.conflict += 1,
            Err(e) => {
                self.failed += 1;
                eprintln!("Create failed: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let user_count = arg(&args, "--users", 1000);
    let concurrency = arg(&args, "--concurrency", 16).max(1);

    let config = Config::from_env()?;

    println!("Load Test - Creating {} users ({} concurrent)", user_count, concurrency);
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    let service = UserService::postgres(pool.clone());
    let run_id = uuid::Uuid::new_v4();
    let since = Utc::now();
    let start = Instant::now();

    let mut tasks: JoinSet<StoreResult<User>> = JoinSet::new();
    let mut tally = Tally::default();

    for i in 0..user_count {
        if tasks.len() as u64 >= concurrency {
            if let Some(result) = tasks.join_next().await {
                tally.record(result?);
            }
        }

        let service = service.clone();
        let name = format!("load-{}-{}", run_id, i);
        tasks.spawn(async move { service.add_user(name, (i % 100) as u8).await });

        if (i + 1) % 1000 == 0 {
            println!("Submitted {} users...", i + 1);
        }
    }

    while let Some(result) = tasks.join_next().await {
        tally.record(result?);
    }

    let elapsed = start.elapsed();
    let rate = tally.success as f64 / elapsed.as_secs_f64();

    let history = service.list_history(since, Utc::now()).await?;
    let prefix = format!("load-{}-", run_id);
    let history_count = history
        .iter()
        .filter(|entry| {
            entry.state["name"]
                .as_str()
                .is_some_and(|name| name.starts_with(&prefix))
        })
        .count() as u64;

    println!("\n=== Load Test Results ===");
    println!("Total users: {}", user_count);
    println!("Successful: {}", tally.success);
    println!("Conflicts: {}", tally.conflict);
    println!("Failed: {}", tally.failed);
    println!("History entries: {}", history_count);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} users/sec", rate);

    if history_count != tally.success {
        anyhow::bail!(
            "history mismatch: {} users created but {} history entries",
            tally.success,
            history_count
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use user_history_api::{StoreError, UserId, UserState};

    #[test]
    fn test_arg_parsing() {
        let args: Vec<String> = ["load_test", "--users", "50", "--concurrency", "x"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(arg(&args, "--users", 1000), 50);
        assert_eq!(arg(&args, "--concurrency", 16), 16);
    }

    #[tokio::test]
    async fn test_tally_counts_joined_outcomes() {
        let mut tasks: JoinSet<StoreResult<User>> = JoinSet::new();
        tasks.spawn(async {
            let now = Utc::now();
            Ok(User {
                id: UserId(1),
                created_at: now,
                updated_at: now,
                state: UserState::new("load", 1),
            })
        });
        tasks.spawn(async {
            Err(StoreError::AlreadyExists(sqlx::Error::RowNotFound)
                .context("transactional: failed to execute transaction"))
        });
        tasks.spawn(async { Err(StoreError::database("insert", sqlx::Error::PoolTimedOut)) });

        let mut tally = Tally::default();
        while let Some(result) = tasks.join_next().await {
            tally.record(result.unwrap());
        }

        assert_eq!(
            tally,
            Tally {
                success: 1,
                conflict: 1,
                failed: 1
            }
        );
    }
}
