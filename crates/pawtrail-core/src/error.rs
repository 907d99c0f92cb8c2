//! Core error types

use thiserror::Error;

use pawtrail_client::{classify, ClientError, ErrorCategory};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] pawtrail_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] pawtrail_session::SessionError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Response is missing field: {0}")]
    MissingField(&'static str),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Client(e) => e.category(),
            other => classify(&other.to_string()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.category().user_message()
    }
}
