//! PawTrail API Client Core
//!
//! Single entry point for every backend call:
//! - Prefixes the configured base URL and injects the session token
//! - Retries network-level failures with a linear backoff
//! - Tears down the session on 401 and reports `SessionExpired`
//! - Classifies failures into user-facing categories

mod cancel;
mod classify;
mod client;
mod descriptor;
mod envelope;
mod error;
mod state;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use cancel::{cancellation, CancelHandle, CancelToken};
pub use classify::{classify, ErrorCategory};
pub use client::{ApiClient, RetryPolicy, DEFAULT_RETRY_DELAY};
pub use descriptor::{
    Method, RequestBody, RequestDescriptor, UploadPart, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT,
};
pub use envelope::ResponseEnvelope;
pub use error::{ClientError, TransportError};
pub use state::RequestState;
pub use transport::{HttpBody, HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, ClientError>;
