//! Application container
//!
//! Owns the database, session store and endpoint API for one process, and
//! runs the flows that move the session between states.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

use pawtrail_client::{ApiClient, ReqwestTransport, Transport};
use pawtrail_session::{Session, SessionEvent, SessionStore, UserProfile};
use pawtrail_storage::Database;

use crate::api::PetTrailApi;
use crate::config::Config;
use crate::diagnostics::NetworkDiagnostics;
use crate::error::CoreError;
use crate::Result;

pub struct PetTrail {
    config: Config,
    db: Database,
    session: SessionStore,
    api: PetTrailApi,
}

impl PetTrail {
    /// Open the on-disk database and talk to the configured backend over HTTP.
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;
        Self::with_transport(config, db, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: Config,
        db: Database,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let session = SessionStore::new(db.clone());
        let client = ApiClient::new(&config.base_url, session.clone(), transport)?;
        let api = PetTrailApi::new(client, &config);

        tracing::info!(
            environment = ?config.environment,
            base_url = %config.base_url,
            "PetTrail initialized"
        );

        Ok(Self {
            config,
            db,
            session,
            api,
        })
    }

    /// Restore the persisted session and, if a token survived, refresh the
    /// profile behind it. A failed refresh leaves the app logged out but is
    /// not an error here.
    pub async fn initialize(&self) -> Result<Session> {
        let restored = self.session.restore()?;
        if restored.is_authenticated() {
            if let Err(e) = self.refresh_user_info().await {
                tracing::warn!(error = %e, "Could not refresh restored session");
            }
        }
        Ok(self.session.snapshot())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let envelope = self.api.login(email, password).await?.into_result()?;

        let token: String = envelope
            .field("session_token")?
            .ok_or(CoreError::MissingField("session_token"))?;
        let user: Option<UserProfile> = match envelope.field("user")? {
            Some(user) => Some(user),
            None => envelope.field("user_info")?,
        };

        self.session.establish(token, user)?;
        tracing::info!(email = %email, "Logged in");

        self.refresh_user_info().await?;
        Ok(self.session.snapshot())
    }

    /// Register a new account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        self.api
            .register(email, password, confirm_password)
            .await?
            .into_result()?;
        tracing::info!(email = %email, "Registered account");
        Ok(())
    }

    /// Pull `/api/user/info` into the session. Any failure tears the
    /// session down.
    pub async fn refresh_user_info(&self) -> Result<Session> {
        let token = self.session.token();
        match self.fetch_user_info().await {
            Ok((user, permissions)) => {
                self.session.update_profile(user, permissions)?;
                Ok(self.session.snapshot())
            }
            Err(e) => {
                tracing::warn!(error = %e, "User info refresh failed, clearing session");
                self.session.expire_token(token.as_deref())?;
                Err(e)
            }
        }
    }

    async fn fetch_user_info(&self) -> Result<(UserProfile, Map<String, Value>)> {
        let envelope = self.api.user_info().await?.into_result()?;
        let user = envelope
            .field::<UserProfile>("user")?
            .ok_or(CoreError::MissingField("user"))?;
        let permissions = envelope.field("permissions")?.unwrap_or_default();
        Ok((user, permissions))
    }

    /// Clear locally, then tell the backend. The backend's answer, even a
    /// 401, cannot turn a user logout into an expiry.
    pub async fn logout(&self) -> Result<()> {
        let token = self.session.token();
        self.session.logout()?;

        if let Some(token) = token {
            if let Err(e) = self.api.logout(&token).await {
                tracing::debug!(error = %e, "Backend logout failed");
            }
        }
        Ok(())
    }

    pub fn api(&self) -> &PetTrailApi {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn diagnostics(&self) -> NetworkDiagnostics {
        NetworkDiagnostics::new(self.api.clone())
    }
}
