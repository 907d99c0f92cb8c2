//! Client error types

use thiserror::Error;

use crate::classify::{classify, ErrorCategory};

/// Failure below HTTP: the request never produced a status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timeout after {0} ms")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("cannot read upload file {path}: {reason}")]
    File { path: String, reason: String },
}

impl TransportError {
    /// Network-level failures are retried; a missing upload file is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::File { .. })
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("session expired: 登录已过期")]
    SessionExpired,

    #[error("request failed: status {0}")]
    Status(u16),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered 200 with `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// User-facing category. Structured variants map directly; everything
    /// else goes through the message-text rules.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::SessionExpired => ErrorCategory::ReAuth,
            ClientError::Transport(e) if e.is_retryable() => ErrorCategory::Connectivity,
            ClientError::Status(code) if *code >= 500 => ErrorCategory::Server,
            other => classify(&other.to_string()),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        assert_eq!(
            ClientError::Status(404).to_string(),
            "request failed: status 404"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(ClientError::SessionExpired.category(), ErrorCategory::ReAuth);
        assert_eq!(
            ClientError::Transport(TransportError::Timeout(10_000)).category(),
            ErrorCategory::Connectivity
        );
        assert_eq!(ClientError::Status(502).category(), ErrorCategory::Server);
        assert_eq!(ClientError::Status(404).category(), ErrorCategory::Generic);
        assert_eq!(
            ClientError::Rejected("登录已过期，请重新登录".to_string()).category(),
            ErrorCategory::ReAuth
        );
        assert_eq!(
            ClientError::Rejected("邮箱或密码错误".to_string()).category(),
            ErrorCategory::Generic
        );
        assert_eq!(ClientError::Cancelled.category(), ErrorCategory::Generic);
    }

    #[test]
    fn test_file_errors_not_retryable() {
        let err = TransportError::File {
            path: "/tmp/missing.jpg".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(TransportError::Connect("refused".to_string()).is_retryable());
    }
}
