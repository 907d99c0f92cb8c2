//! Scripted transport for tests
//!
//! Replies are consumed in order; once the script runs dry the fallback
//! reply (if any) answers every further request.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: Vec<u8> },
    Fail(TransportError),
    /// Never answers; lets the client's timeout fire
    Stall,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: HttpRequest,
    pub at: Instant,
}

#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Option<Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.script.lock().push_back(reply);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Reply::Respond {
            status,
            body: body.to_string().into_bytes(),
        });
    }

    pub fn push_raw(&self, status: u16, body: &[u8]) {
        self.push(Reply::Respond {
            status,
            body: body.to_vec(),
        });
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Reply::Fail(error));
    }

    pub fn set_fallback(&self, reply: Reply) {
        *self.fallback.lock() = Some(reply);
    }

    pub fn set_fallback_json(&self, status: u16, body: Value) {
        self.set_fallback(Reply::Respond {
            status,
            body: body.to_string().into_bytes(),
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_reply(&self) -> Option<Reply> {
        self.script
            .lock()
            .pop_front()
            .or_else(|| self.fallback.lock().clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(RecordedRequest {
            request,
            at: Instant::now(),
        });

        match self.next_reply() {
            Some(Reply::Respond { status, body }) => Ok(HttpResponse { status, body }),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Stall) => std::future::pending().await,
            None => Err(TransportError::Connect(
                "mock transport has no scripted reply".to_string(),
            )),
        }
    }
}
