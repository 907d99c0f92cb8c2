//! Session Store
//!
//! Owns the process-wide session. Every mutation goes through here and is
//! written through to storage.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

use pawtrail_storage::Database;

use crate::error::SessionError;
use crate::session::{Session, UserProfile};
use crate::Result;

pub const SESSION_TOKEN_KEY: &str = "session_token";
pub const USER_INFO_KEY: &str = "user_info";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established by login
    LoggedIn,
    /// The user logged out explicitly
    LoggedOut,
    /// The backend rejected the token. UI layers route to the login screen.
    Expired,
}

pub struct SessionStore {
    session: Arc<RwLock<Session>>,
    db: Database,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            db,
            events,
        }
    }

    /// Load the persisted token and profile. A corrupt cached profile is
    /// dropped rather than failing startup.
    pub fn restore(&self) -> Result<Session> {
        let token = self.db.get_value(SESSION_TOKEN_KEY)?;
        let user = match self.db.get_value(USER_INFO_KEY)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable cached user profile");
                    self.db.remove_value(USER_INFO_KEY)?;
                    None
                }
            },
            None => None,
        };

        let mut session = self.session.write();
        session.clear();
        if let Some(token) = token {
            *session = Session::new(token, user);
        }

        tracing::info!(
            authenticated = session.is_authenticated(),
            "Restored session"
        );

        Ok(session.clone())
    }

    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start a session after a successful login.
    pub fn establish(&self, token: String, user: Option<UserProfile>) -> Result<Session> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let user_json = user.as_ref().map(serde_json::to_string).transpose()?;

        let mut session = self.session.write();
        self.db.set_value(SESSION_TOKEN_KEY, &token)?;
        match user_json {
            Some(json) => self.db.set_value(USER_INFO_KEY, &json)?,
            None => {
                self.db.remove_value(USER_INFO_KEY)?;
            }
        }
        *session = Session::new(token, user);

        tracing::info!("Established session");
        let _ = self.events.send(SessionEvent::LoggedIn);

        Ok(session.clone())
    }

    /// Replace the cached profile after a user-info refresh. Ignored when no
    /// session is live, so a late response cannot resurrect a cleared one.
    pub fn update_profile(
        &self,
        user: UserProfile,
        permissions: Map<String, Value>,
    ) -> Result<bool> {
        let json = serde_json::to_string(&user)?;

        let mut session = self.session.write();
        if !session.is_authenticated() {
            return Ok(false);
        }
        self.db.set_value(USER_INFO_KEY, &json)?;
        session.set_profile(user, permissions);

        tracing::debug!(user_level = session.user_level, "Updated user profile");
        Ok(true)
    }

    /// Explicit logout. Returns whether a live session was cleared.
    pub fn logout(&self) -> Result<bool> {
        let cleared = self.teardown(|_| true)?;
        if cleared {
            tracing::info!("Logged out");
            let _ = self.events.send(SessionEvent::LoggedOut);
        }
        Ok(cleared)
    }

    /// Teardown after the backend rejected the token.
    ///
    /// Idempotent: only the call that actually clears a live session emits
    /// `Expired`; later calls are no-ops and return `false`.
    pub fn expire(&self) -> Result<bool> {
        self.expire_when(|_| true)
    }

    /// Like `expire`, but only while the live session still holds `token`.
    /// A rejection of a request sent under an older token leaves a newer
    /// session alone.
    pub fn expire_token(&self, token: Option<&str>) -> Result<bool> {
        self.expire_when(|session| session.token.as_deref() == token)
    }

    fn expire_when(&self, matches: impl FnOnce(&Session) -> bool) -> Result<bool> {
        let cleared = self.teardown(matches)?;
        if cleared {
            tracing::warn!("Session expired");
            let _ = self.events.send(SessionEvent::Expired);
        }
        Ok(cleared)
    }

    /// Persisted copies go first; memory is only cleared once they are gone,
    /// so a failed delete leaves the session live for the next attempt.
    fn teardown(&self, matches: impl FnOnce(&Session) -> bool) -> Result<bool> {
        let mut session = self.session.write();
        if !session.is_live() || !matches(&session) {
            return Ok(false);
        }
        self.db.remove_values(&[SESSION_TOKEN_KEY, USER_INFO_KEY])?;
        session.clear();
        Ok(true)
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            db: self.db.clone(),
            events: self.events.clone(),
        }
    }
}
