//! API client
//!
//! Every backend call goes through `ApiClient::request`. One client is built
//! per process (or per test) around an explicit `SessionStore` handle.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use pawtrail_session::SessionStore;

use crate::cancel::CancelToken;
use crate::descriptor::{RequestBody, RequestDescriptor};
use crate::envelope::ResponseEnvelope;
use crate::error::{ClientError, TransportError};
use crate::state::RequestState;
use crate::transport::{HttpBody, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::Result;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Linear backoff: the wait after attempt `n` is `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

pub struct ApiClient {
    /// Base URL without a trailing slash
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: SessionStore,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url}: unsupported scheme"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            retry: RetryPolicy::default(),
        })
    }

    /// Client backed by a real HTTP stack.
    pub fn with_reqwest(base_url: &str, session: SessionStore) -> Result<Self> {
        Self::new(base_url, session, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ResponseEnvelope> {
        self.request_with_cancel(descriptor, &CancelToken::never())
            .await
    }

    /// Run one request to settlement. Cancellation is honored before each
    /// attempt and during each backoff delay.
    pub async fn request_with_cancel(
        &self,
        mut descriptor: RequestDescriptor,
        cancel: &CancelToken,
    ) -> Result<ResponseEnvelope> {
        let request_id = Uuid::new_v4();
        let url = self.request_url(&descriptor)?;
        let mut state = RequestState::Pending;

        loop {
            if cancel.is_cancelled() {
                state.advance(RequestState::Cancelled);
                tracing::debug!(request_id = %request_id, "Request cancelled");
                return Err(ClientError::Cancelled);
            }

            let attempt = descriptor.begin_attempt();
            tracing::debug!(
                request_id = %request_id,
                method = %descriptor.method,
                path = %descriptor.path,
                attempt,
                "Dispatching request"
            );

            let token = self.session.token();
            let request = self.build_request(&descriptor, &url, token.as_deref());
            match self.dispatch(request).await {
                Ok(response) => {
                    return self.settle(
                        &mut state,
                        request_id,
                        &descriptor,
                        token.as_deref(),
                        response,
                    );
                }
                Err(err) if err.is_retryable() && attempt <= descriptor.max_retries => {
                    state.advance(RequestState::Failed);
                    state.advance(RequestState::Retrying);

                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        request_id = %request_id,
                        path = %descriptor.path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            state.advance(RequestState::Cancelled);
                            tracing::debug!(request_id = %request_id, "Request cancelled during backoff");
                            return Err(ClientError::Cancelled);
                        }
                    }

                    state.advance(RequestState::Pending);
                }
                Err(err) => {
                    state.advance(RequestState::Failed);
                    state.advance(RequestState::Exhausted);
                    tracing::warn!(
                        request_id = %request_id,
                        path = %descriptor.path,
                        attempt,
                        error = %err,
                        "Request failed"
                    );
                    return Err(err.into());
                }
            }
        }
    }

    fn settle(
        &self,
        state: &mut RequestState,
        request_id: Uuid,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope> {
        match response.status {
            200 => match ResponseEnvelope::from_slice(&response.body) {
                Ok(envelope) => {
                    state.advance(RequestState::Success);
                    tracing::debug!(
                        request_id = %request_id,
                        path = %descriptor.path,
                        success = envelope.success,
                        "Request settled"
                    );
                    Ok(envelope)
                }
                Err(e) => {
                    state.advance(RequestState::Failed);
                    state.advance(RequestState::Exhausted);
                    tracing::warn!(
                        request_id = %request_id,
                        path = %descriptor.path,
                        error = %e,
                        "Malformed response body"
                    );
                    Err(ClientError::Parse(e))
                }
            },
            401 => {
                state.advance(RequestState::SessionCleared);
                self.handle_unauthorized(request_id, token);
                Err(ClientError::SessionExpired)
            }
            status => {
                state.advance(RequestState::Failed);
                state.advance(RequestState::Exhausted);
                tracing::warn!(
                    request_id = %request_id,
                    path = %descriptor.path,
                    status,
                    "Request rejected by server"
                );
                Err(ClientError::Status(status))
            }
        }
    }

    /// Tear down the session the rejected request was sent under. A session
    /// established while the request was in flight is left alone.
    fn handle_unauthorized(&self, request_id: Uuid, token: Option<&str>) {
        match self.session.expire_token(token) {
            Ok(true) => {
                tracing::info!(request_id = %request_id, "Session cleared after 401");
            }
            Ok(false) => {
                tracing::debug!(request_id = %request_id, "401 for a session that is already gone");
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to evict persisted session after 401"
                );
            }
        }
    }

    /// Single unauthenticated attempt that hands back the raw response.
    /// No retries, no envelope parsing and no session teardown on 401.
    pub async fn probe(&self, descriptor: RequestDescriptor) -> Result<HttpResponse> {
        let url = self.request_url(&descriptor)?;
        let request = self.build_request(&descriptor, &url, None);
        let response = self.dispatch(request).await?;
        tracing::debug!(
            path = %descriptor.path,
            status = response.status,
            "Probe answered"
        );
        Ok(response)
    }

    async fn dispatch(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let timeout = request.timeout;

        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Full target URL. GET and DELETE fields become query parameters.
    fn request_url(&self, descriptor: &RequestDescriptor) -> Result<String> {
        let resolved = self.resolve_url(&descriptor.path);

        let fields = match &descriptor.body {
            RequestBody::Json(map) if descriptor.method.uses_query() && !map.is_empty() => map,
            _ => return Ok(resolved),
        };

        let mut url = Url::parse(&resolved)
            .map_err(|e| ClientError::InvalidUrl(format!("{resolved}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in fields {
                query.append_pair(key, &query_value(value));
            }
        }
        Ok(url.to_string())
    }

    /// Headers are rebuilt per attempt so a retry sees the current token.
    fn build_request(
        &self,
        descriptor: &RequestDescriptor,
        url: &str,
        token: Option<&str>,
    ) -> HttpRequest {
        let mut headers: Vec<(String, String)> = Vec::new();

        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = match &descriptor.body {
            RequestBody::Json(map) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                if descriptor.method.uses_query() {
                    HttpBody::Empty
                } else {
                    HttpBody::Json(json_bytes(map))
                }
            }
            RequestBody::Upload(part) => HttpBody::Multipart(part.clone()),
        };

        for (name, value) in &descriptor.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            method: descriptor.method,
            url: url.to_string(),
            headers,
            body,
            timeout: descriptor.timeout,
        }
    }
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
            session: self.session.clone(),
            retry: self.retry,
        }
    }
}

fn json_bytes(map: &Map<String, Value>) -> Vec<u8> {
    Value::Object(map.clone()).to_string().into_bytes()
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancellation;
    use crate::classify::ErrorCategory;
    use crate::mock::{MockTransport, Reply};
    use futures_util::future::join_all;
    use pawtrail_session::{SessionEvent, SESSION_TOKEN_KEY};
    use pawtrail_storage::Database;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    const BASE: &str = "https://api.example.com";

    fn setup() -> (ApiClient, Arc<MockTransport>, Database) {
        let db = Database::open_in_memory().unwrap();
        let session = SessionStore::new(db.clone());
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(BASE, session, transport.clone()).unwrap();
        (client, transport, db)
    }

    fn timeout_err() -> TransportError {
        TransportError::Timeout(10_000)
    }

    #[test]
    fn test_resolve_url() {
        let (client, _, _) = setup();
        assert_eq!(
            client.resolve_url("/api/user/info"),
            "https://api.example.com/api/user/info"
        );
        assert_eq!(
            client.resolve_url("api/user/info"),
            "https://api.example.com/api/user/info"
        );

        let session = SessionStore::new(Database::open_in_memory().unwrap());
        let trailing =
            ApiClient::new("http://localhost:8000/", session, Arc::new(MockTransport::new()))
                .unwrap();
        assert_eq!(trailing.resolve_url("/api/health"), "http://localhost:8000/api/health");
    }

    #[test]
    fn test_invalid_base_url() {
        let session = SessionStore::new(Database::open_in_memory().unwrap());
        let transport: Arc<dyn Transport> = Arc::new(MockTransport::new());
        assert!(matches!(
            ApiClient::new("not a url", session.clone(), transport.clone()),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://files.example.com", session, transport),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_success_passes_envelope_through() {
        let (client, transport, _) = setup();
        let body = json!({
            "success": true,
            "memorials": [{"id": 3, "pet": {"name": "Mimi", "photos": []}}]
        });
        transport.push_json(200, body.clone());

        let envelope = client
            .request(RequestDescriptor::get("/api/user/memorials"))
            .await
            .unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.get("memorials"), body.get("memorials"));
        assert_eq!(transport.request_count(), 1);
        let sent = &transport.requests()[0].request;
        assert_eq!(sent.url, "https://api.example.com/api/user/memorials");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_token_attached_as_bearer() {
        let (client, transport, _) = setup();
        client.session().establish("abc".to_string(), None).unwrap();
        transport.push_json(200, json!({"success": true}));

        client
            .request(RequestDescriptor::get("/api/user/info"))
            .await
            .unwrap();

        let sent = &transport.requests()[0].request;
        assert_eq!(sent.header("Authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_descriptor_headers_override_defaults() {
        let (client, transport, _) = setup();
        transport.push_json(200, json!({"success": true}));

        client
            .request(
                RequestDescriptor::post("/api/memorial/create")
                    .with_header("content-type", "application/json; charset=utf-8"),
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0].request;
        let content_types: Vec<_> = sent
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "application/json; charset=utf-8");
    }

    #[tokio::test]
    async fn test_post_body_and_get_query() {
        let (client, transport, _) = setup();
        transport.set_fallback_json(200, json!({"success": true}));

        client
            .request(
                RequestDescriptor::post("/api/payment/create")
                    .with_field("plan_id", 2)
                    .with_field("payment_method", "wechat"),
            )
            .await
            .unwrap();
        client
            .request(RequestDescriptor::get("/api/user/photos").with_field("page", 2))
            .await
            .unwrap();

        let requests = transport.requests();
        let HttpBody::Json(bytes) = &requests[0].request.body else {
            panic!("expected json body");
        };
        let sent: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(sent, json!({"plan_id": 2, "payment_method": "wechat"}));

        assert_eq!(requests[1].request.body, HttpBody::Empty);
        assert_eq!(
            requests[1].request.url,
            "https://api.example.com/api/user/photos?page=2"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_once() {
        let (client, transport, db) = setup();
        client.session().establish("abc".to_string(), None).unwrap();
        let mut events = client.session().subscribe();
        transport.push_json(401, json!({"detail": "Not authenticated"}));

        let err = client
            .request(RequestDescriptor::get("/api/user/info"))
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(err.category(), ErrorCategory::ReAuth);
        // 401 is never retried
        assert_eq!(transport.request_count(), 1);
        assert!(client.session().token().is_none());
        assert_eq!(db.get_value(SESSION_TOKEN_KEY).unwrap(), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_emits_single_expiry() {
        let (client, transport, _) = setup();
        client.session().establish("abc".to_string(), None).unwrap();
        let mut events = client.session().subscribe();
        transport.set_fallback_json(401, json!({"detail": "Not authenticated"}));

        let results = join_all((0..5).map(|i| {
            client.request(RequestDescriptor::get(format!("/api/memorial/get/{i}")))
        }))
        .await;

        assert!(results.iter().all(|r| matches!(r, Err(ClientError::SessionExpired))));
        assert_eq!(transport.request_count(), 5);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    /// Logs in again while the request is in flight, then rejects it.
    struct ReloginTransport {
        session: SessionStore,
    }

    #[async_trait::async_trait]
    impl Transport for ReloginTransport {
        async fn send(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.session.establish("fresh".to_string(), None).unwrap();
            Ok(HttpResponse {
                status: 401,
                body: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_stale_unauthorized_keeps_newer_session() {
        let db = Database::open_in_memory().unwrap();
        let session = SessionStore::new(db.clone());
        session.establish("stale".to_string(), None).unwrap();
        let transport = Arc::new(ReloginTransport {
            session: session.clone(),
        });
        let client = ApiClient::new(BASE, session, transport).unwrap();
        let mut events = client.session().subscribe();

        let err = client
            .request(RequestDescriptor::get("/api/user/info"))
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(client.session().token().as_deref(), Some("fresh"));
        assert_eq!(db.get_value(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedIn);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_probe_returns_raw_response() {
        let (client, transport, _) = setup();
        client.session().establish("abc".to_string(), None).unwrap();
        transport.push_raw(401, b"");
        transport.push_raw(200, b"OK");
        transport.push_json(500, json!({"detail": "boom"}));

        let unauthorized = client.probe(RequestDescriptor::get("/api/health")).await.unwrap();
        let plain = client.probe(RequestDescriptor::get("/api/health")).await.unwrap();
        let failed = client.probe(RequestDescriptor::get("/api/health")).await.unwrap();

        assert_eq!(unauthorized.status, 401);
        assert_eq!((plain.status, plain.body.as_slice()), (200, &b"OK"[..]));
        assert_eq!(failed.status, 500);
        // No token sent, no teardown
        assert_eq!(client.session().token().as_deref(), Some("abc"));
        assert!(transport
            .requests()
            .iter()
            .all(|r| r.request.header("Authorization").is_none()));
    }

    #[tokio::test]
    async fn test_probe_does_not_retry() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(timeout_err()));

        let err = client
            .probe(RequestDescriptor::get("/api/health").with_max_retries(2))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Timeout(_))));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let (client, transport, _) = setup();
        transport.push_json(500, json!({"detail": "boom"}));

        let err = client
            .request(RequestDescriptor::get("/api/user/dashboard"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Status(500)));
        assert_eq!(err.to_string(), "request failed: status 500");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (client, transport, _) = setup();
        transport.push_raw(200, b"<html>502 Bad Gateway</html>");

        let err = client
            .request(RequestDescriptor::get("/api/health"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Parse(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_twice_then_success() {
        let (client, transport, _) = setup();
        transport.push_error(timeout_err());
        transport.push_error(timeout_err());
        transport.push_json(200, json!({"success": true, "plans": []}));

        let envelope = client
            .request(RequestDescriptor::get("/api/payment/plans"))
            .await
            .unwrap();

        assert!(envelope.success);
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].at - requests[0].at, Duration::from_millis(1000));
        assert_eq!(requests[2].at - requests[1].at, Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(TransportError::Connect("refused".to_string())));

        let started = tokio::time::Instant::now();
        let err = client
            .request(RequestDescriptor::get("/api/user/orders"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Connect(_))
        ));
        assert_eq!(err.category(), ErrorCategory::Connectivity);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(timeout_err()));

        let result = client
            .request(RequestDescriptor::get("/api/health").with_max_retries(0))
            .await;

        assert!(result.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_descriptor_timeout_applied() {
        let (client, transport, _) = setup();
        transport.push(Reply::Stall);

        let started = tokio::time::Instant::now();
        let err = client
            .request(
                RequestDescriptor::get("/api/health")
                    .with_timeout(Duration::from_millis(500))
                    .with_max_retries(0),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Timeout(500))
        ));
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(timeout_err()));
        let (handle, token) = cancellation();

        let (result, _) = tokio::join!(
            client.request_with_cancel(RequestDescriptor::get("/api/user/photos"), &token),
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                handle.cancel();
            }
        );

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_dispatch() {
        let (client, transport, _) = setup();
        let (handle, token) = cancellation();
        handle.cancel();

        let result = client
            .request_with_cancel(RequestDescriptor::get("/api/health"), &token)
            .await;

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_with_bearer() {
        let (client, transport, _) = setup();
        client.session().establish("abc".to_string(), None).unwrap();
        transport.push_json(200, json!({"success": true, "photo": {"id": 9}}));

        let envelope = client
            .request(
                RequestDescriptor::upload("/api/photos/upload", "/tmp/mimi.jpg", "photo")
                    .with_field("memorial_id", 3),
            )
            .await
            .unwrap();

        assert_eq!(envelope.get("photo"), Some(&json!({"id": 9})));
        let sent = &transport.requests()[0].request;
        assert_eq!(sent.header("authorization"), Some("Bearer abc"));
        assert_eq!(sent.header("content-type"), None);
        let HttpBody::Multipart(part) = &sent.body else {
            panic!("expected multipart body");
        };
        assert_eq!(part.field_name, "photo");
        assert_eq!(part.form["memorial_id"], "3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_single_attempt_by_default() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(timeout_err()));

        let result = client
            .request(RequestDescriptor::upload(
                "/api/photos/upload",
                "/tmp/mimi.jpg",
                "photo",
            ))
            .await;

        assert!(result.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_file_errors_not_retried() {
        let (client, transport, _) = setup();
        transport.set_fallback(Reply::Fail(TransportError::File {
            path: "/tmp/missing.jpg".to_string(),
            reason: "not found".to_string(),
        }));

        let err = client
            .request(
                RequestDescriptor::upload("/api/photos/upload", "/tmp/missing.jpg", "photo")
                    .with_max_retries(2),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::File { .. })));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_retry_policy_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }
}
