//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{HistoryEntry, User};
use crate::error::{AppError, AppResult};
use crate::service::UserService;

// =========================================================================
// Request types
// =========================================================================

/// Query string of `POST /users`
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
}

/// Query string of `GET /users/history`, timestamps in RFC 3339
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl CreateUserQuery {
    /// Validate into a non-empty name and an age in `0..=255`
    pub fn validate(self) -> AppResult<(String, u8)> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("name is required".to_string()))?;

        let age = self
            .age
            .ok_or_else(|| AppError::InvalidRequest("age is required".to_string()))?;
        let age = age
            .parse::<u8>()
            .map_err(|_| AppError::InvalidRequest(format!("age must be 0-255, got {:?}", age)))?;

        Ok((name, age))
    }
}

impl HistoryQuery {
    /// Resolve into a `[from, to)` range; `to` defaults to `now`
    pub fn range(self, now: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let from = self
            .from
            .ok_or_else(|| AppError::InvalidRequest("from is required".to_string()))?;
        let from = parse_timestamp("from", &from)?;

        let to = match self.to {
            Some(to) => parse_timestamp("to", &to)?,
            None => now,
        };

        Ok((from, to))
    }
}

fn parse_timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::InvalidRequest(format!("{} must be an RFC 3339 timestamp: {}", field, e)))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<UserService> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/history", get(list_history))
}

// =========================================================================
// POST /users
// =========================================================================

/// Create a new user and its history entry
async fn create_user(
    State(service): State<UserService>,
    Query(query): Query<CreateUserQuery>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let (name, age) = query.validate()?;

    let user = service.add_user(name, age).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

// =========================================================================
// GET /users/history
// =========================================================================

/// List history entries in `[from, to)`, newest first
async fn list_history(
    State(service): State<UserService>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let (from, to) = query.range(Utc::now())?;

    let entries = service.list_history(from, to).await?;

    Ok(Json(entries))
}
