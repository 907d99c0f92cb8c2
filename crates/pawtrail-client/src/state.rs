//! Request lifecycle
//!
//! ```text
//! Pending ──► Success
//!    │    ──► SessionCleared        (401)
//!    │    ──► Cancelled
//!    ▼
//! Failed ──► Exhausted              (not retryable, or no retries left)
//!    │
//!    ▼
//! Retrying ──► Pending              (after backoff)
//!          ──► Cancelled
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// An attempt is in flight
    Pending,
    Success,
    /// 401: the session was torn down
    SessionCleared,
    /// The last attempt failed, outcome not decided yet
    Failed,
    /// Waiting out the backoff delay
    Retrying,
    Exhausted,
    Cancelled,
}

impl RequestState {
    pub fn can_transition_to(&self, target: RequestState) -> bool {
        matches!(
            (self, target),
            (RequestState::Pending, RequestState::Success)
                | (RequestState::Pending, RequestState::SessionCleared)
                | (RequestState::Pending, RequestState::Failed)
                | (RequestState::Pending, RequestState::Cancelled)
                | (RequestState::Failed, RequestState::Retrying)
                | (RequestState::Failed, RequestState::Exhausted)
                | (RequestState::Retrying, RequestState::Pending)
                | (RequestState::Retrying, RequestState::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Success
                | RequestState::SessionCleared
                | RequestState::Exhausted
                | RequestState::Cancelled
        )
    }

    pub(crate) fn advance(&mut self, target: RequestState) {
        debug_assert!(
            self.can_transition_to(target),
            "invalid request transition {self} -> {target}"
        );
        tracing::trace!(from = %self, to = %target, "Request state");
        *self = target;
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::Success => "success",
            RequestState::SessionCleared => "session_cleared",
            RequestState::Failed => "failed",
            RequestState::Retrying => "retrying",
            RequestState::Exhausted => "exhausted",
            RequestState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
