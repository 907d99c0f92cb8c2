//! PawTrail Storage Layer
//!
//! SQLite-backed key-value persistence. Plays the role the host runtime's
//! local storage played for the mini-program: the session token and the
//! cached user profile live here between runs.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
