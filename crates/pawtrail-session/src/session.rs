//! Session data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile as returned by `/api/user/info`.
///
/// Only the fields the client reads are typed; everything else the backend
/// sends is kept in `extra` so the cached copy round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub user_level: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token issued by `/api/auth/login`
    pub token: Option<String>,
    /// Cached profile of the logged-in user
    pub user: Option<UserProfile>,
    pub user_level: i64,
    /// Permission flags from the last user-info refresh
    pub permissions: Map<String, Value>,
    /// When the token was set locally. The backend does not report expiry.
    pub established_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: String, user: Option<UserProfile>) -> Self {
        let user_level = user.as_ref().map(|u| u.user_level).unwrap_or_default();
        Self {
            token: Some(token),
            user,
            user_level,
            permissions: Map::new(),
            established_at: Some(Utc::now()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True when there is anything left to tear down.
    pub fn is_live(&self) -> bool {
        self.token.is_some() || self.user.is_some()
    }

    pub fn set_profile(&mut self, user: UserProfile, permissions: Map<String, Value>) {
        self.user_level = user.user_level;
        self.user = Some(user);
        self.permissions = permissions;
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
