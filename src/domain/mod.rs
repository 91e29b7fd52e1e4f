//! Domain module
//!
//! Core domain types: users and their lifecycle history.

pub mod history;
pub mod user;

pub use history::{Action, HistoryEntry};
pub use user::{User, UserId, UserState};
