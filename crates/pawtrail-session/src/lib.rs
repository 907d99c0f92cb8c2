//! PawTrail Session Management
//!
//! - A Session holds the auth token and the cached user profile
//! - Token and profile are persisted and restored at process start
//! - Teardown (logout, expiry) evicts the persisted copies
//! - Expiry is idempotent: concurrent 401s produce a single `Expired` event

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{Session, UserProfile};
pub use store::{SessionEvent, SessionStore, SESSION_TOKEN_KEY, USER_INFO_KEY};

pub type Result<T> = std::result::Result<T, SessionError>;
