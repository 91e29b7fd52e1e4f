//! user-history library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use config::Config;
pub use domain::{Action, HistoryEntry, User, UserId, UserState};
pub use error::{AppError, AppResult};
pub use service::UserService;
pub use store::{ErrorKind, StoreError};
