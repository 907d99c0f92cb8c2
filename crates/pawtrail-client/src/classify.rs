//! Error classification
//!
//! The backend never sent structured error codes, so screens decided what to
//! show by looking for marker words in the failure text. The rules below keep
//! that behavior: evaluated top to bottom, first match wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Session is gone, the user must log in again
    ReAuth,
    /// Timeout or connection trouble
    Connectivity,
    /// The backend failed
    Server,
    Generic,
}

impl ErrorCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::ReAuth => "登录已过期，请重新登录",
            ErrorCategory::Connectivity => "网络错误，请稍后重试",
            ErrorCategory::Server => "服务器错误，请稍后重试",
            ErrorCategory::Generic => "操作失败",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ReAuth => "reauth",
            ErrorCategory::Connectivity => "connectivity",
            ErrorCategory::Server => "server",
            ErrorCategory::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Markers are matched against the lowercased message.
const RULES: &[(&str, ErrorCategory)] = &[
    ("登录已过期", ErrorCategory::ReAuth),
    ("session expired", ErrorCategory::ReAuth),
    ("timeout", ErrorCategory::Connectivity),
    ("超时", ErrorCategory::Connectivity),
    ("network", ErrorCategory::Connectivity),
    ("网络", ErrorCategory::Connectivity),
    ("connection", ErrorCategory::Connectivity),
    ("服务器", ErrorCategory::Server),
    ("server error", ErrorCategory::Server),
    // "request failed: status 5xx"
    ("status 5", ErrorCategory::Server),
];

pub fn classify(message: &str) -> ErrorCategory {
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(marker, _)| message.contains(marker))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Generic)
}
