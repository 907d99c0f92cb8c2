//! PawTrail Core
//!
//! Wires storage, session and the API client together for the pet memorial
//! service: typed endpoints, login/logout flows and network diagnostics.

mod api;
mod app;
mod config;
mod diagnostics;
mod error;

pub use api::PetTrailApi;
pub use app::PetTrail;
pub use config::{Config, Environment};
pub use diagnostics::{recommendations, ApiCheck, DiagnosticReport, NetworkDiagnostics};
pub use error::CoreError;

// Re-export the building blocks
pub use pawtrail_client::{
    cancellation, classify, ApiClient, CancelHandle, CancelToken, ClientError, ErrorCategory,
    HttpResponse, Method, RequestDescriptor, ResponseEnvelope, ReqwestTransport, RetryPolicy,
    Transport, TransportError,
};
pub use pawtrail_session::{Session, SessionError, SessionEvent, SessionStore, UserProfile};
pub use pawtrail_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
