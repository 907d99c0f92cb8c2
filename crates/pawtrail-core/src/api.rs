//! Backend endpoints
//!
//! Thin typed wrappers: each builds a descriptor with the configured
//! timeout and retry bounds and hands it to the client. Envelopes come back
//! as-is; flows that care about `success` check it themselves.

use futures_util::future::try_join_all;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pawtrail_client::{
    ApiClient, HttpResponse, Method, RequestDescriptor, ResponseEnvelope, Result,
};

use crate::config::Config;

const PHOTO_FIELD: &str = "photo";

#[derive(Clone)]
pub struct PetTrailApi {
    client: ApiClient,
    timeout: Duration,
    max_retries: u32,
    upload_max_retries: u32,
    health_timeout: Duration,
}

impl PetTrailApi {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        Self {
            client,
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
            upload_max_retries: config.upload_max_retries,
            health_timeout: config.health_timeout(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn descriptor(&self, method: Method, path: impl Into<String>) -> RequestDescriptor {
        RequestDescriptor::new(method, path)
            .with_timeout(self.timeout)
            .with_max_retries(self.max_retries)
    }

    // === Auth ===

    pub async fn login(&self, email: &str, password: &str) -> Result<ResponseEnvelope> {
        self.client
            .request(
                self.descriptor(Method::Post, "/api/auth/login")
                    .with_field("email", email)
                    .with_field("password", password),
            )
            .await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<ResponseEnvelope> {
        self.client
            .request(
                self.descriptor(Method::Post, "/api/auth/register")
                    .with_field("email", email)
                    .with_field("password", password)
                    .with_field("confirm_password", confirm_password),
            )
            .await
    }

    /// Revoke `token` on the backend. The token is passed explicitly because
    /// callers clear the local session before telling the backend.
    pub async fn logout(&self, token: &str) -> Result<ResponseEnvelope> {
        self.client
            .request(
                self.descriptor(Method::Post, "/api/auth/logout")
                    .with_header("Authorization", format!("Bearer {token}")),
            )
            .await
    }

    // === User ===

    pub async fn user_info(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/info"))
            .await
    }

    pub async fn level_info(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/level-info"))
            .await
    }

    pub async fn dashboard(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/dashboard"))
            .await
    }

    pub async fn check_permission(&self, permission: &str) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, format!("/api/user/permissions/{permission}")))
            .await
    }

    // === Memorials ===

    pub async fn memorials(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/memorials"))
            .await
    }

    pub async fn memorial(&self, id: impl Display) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, format!("/api/memorial/get/{id}")))
            .await
    }

    pub async fn create_memorial(&self, fields: Map<String, Value>) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Post, "/api/memorial/create").with_body(fields))
            .await
    }

    pub async fn update_memorial(
        &self,
        id: impl Display,
        fields: Map<String, Value>,
    ) -> Result<ResponseEnvelope> {
        self.client
            .request(
                self.descriptor(Method::Put, format!("/api/memorial/update/{id}"))
                    .with_body(fields),
            )
            .await
    }

    pub async fn delete_memorial(&self, id: impl Display) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Delete, format!("/api/memorial/delete/{id}")))
            .await
    }

    // === Photos ===

    pub async fn photos(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/photos"))
            .await
    }

    pub async fn upload_photo(&self, file: impl AsRef<Path>) -> Result<ResponseEnvelope> {
        let descriptor =
            RequestDescriptor::upload("/api/photos/upload", file.as_ref(), PHOTO_FIELD)
                .with_timeout(self.timeout)
                .with_max_retries(self.upload_max_retries);
        self.client.request(descriptor).await
    }

    /// Upload several photos concurrently. The first failure fails the batch;
    /// uploads that already finished are not rolled back.
    pub async fn upload_photos(&self, files: &[PathBuf]) -> Result<Vec<ResponseEnvelope>> {
        tracing::debug!(count = files.len(), "Uploading photos");
        try_join_all(files.iter().map(|file| self.upload_photo(file))).await
    }

    pub async fn delete_photo(&self, id: impl Display) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Delete, format!("/api/photos/delete/{id}")))
            .await
    }

    // === Payments ===

    pub async fn payment_plans(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/payment/plans"))
            .await
    }

    pub async fn create_payment(
        &self,
        plan_id: impl Into<Value>,
        payment_method: &str,
    ) -> Result<ResponseEnvelope> {
        self.client
            .request(
                self.descriptor(Method::Post, "/api/payment/create")
                    .with_field("plan_id", plan_id)
                    .with_field("payment_method", payment_method),
            )
            .await
    }

    pub async fn orders(&self) -> Result<ResponseEnvelope> {
        self.client
            .request(self.descriptor(Method::Get, "/api/user/orders"))
            .await
    }

    // === Service ===

    /// Health probe: short timeout, single unauthenticated attempt. Any HTTP
    /// answer comes back as-is, whatever its status or body.
    pub async fn health(&self) -> Result<HttpResponse> {
        self.client
            .probe(RequestDescriptor::get("/api/health").with_timeout(self.health_timeout))
            .await
    }
}
