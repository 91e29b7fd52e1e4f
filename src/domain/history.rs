//! User history
//!
//! Append-only record of user lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Lifecycle action recorded in the history table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "wasCreated")]
    WasCreated,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::WasCreated => "wasCreated",
        }
    }

    /// Parse the stored tag back into an action
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "wasCreated" => Some(Action::WasCreated),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: UserId,
    pub action: Action,
    /// Snapshot of the user state at the time of the event
    pub state: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
