//! Network diagnostics
//!
//! Pings the health endpoint and turns the outcome into advice for the
//! network-test screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use pawtrail_client::ErrorCategory;

use crate::api::PetTrailApi;

/// Responses slower than this get the slow-network advice
const SLOW_RESPONSE_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCheck {
    /// An HTTP response came back, whatever its status
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub timestamp: DateTime<Utc>,
    pub base_url: String,
    pub api: ApiCheck,
    pub recommendations: Vec<String>,
}

#[derive(Clone)]
pub struct NetworkDiagnostics {
    api: PetTrailApi,
}

impl NetworkDiagnostics {
    pub fn new(api: PetTrailApi) -> Self {
        Self { api }
    }

    /// Ping `/api/health` once with the short health timeout.
    pub async fn check_api(&self) -> ApiCheck {
        let started = Instant::now();
        let result = self.api.health().await;
        let elapsed = started.elapsed().as_millis() as u64;

        let check = match result {
            Ok(response) => ApiCheck {
                success: true,
                response_time_ms: Some(elapsed),
                status: Some(response.status),
                error: None,
                category: None,
            },
            Err(e) => ApiCheck {
                success: false,
                response_time_ms: None,
                status: None,
                error: Some(e.to_string()),
                category: Some(e.category()),
            },
        };

        tracing::info!(
            success = check.success,
            status = ?check.status,
            response_time_ms = ?check.response_time_ms,
            "API health check finished"
        );
        check
    }

    pub async fn report(&self) -> DiagnosticReport {
        let api = self.check_api().await;
        DiagnosticReport {
            timestamp: Utc::now(),
            base_url: self.api.client().base_url().to_string(),
            recommendations: recommendations(&api),
            api,
        }
    }
}

pub fn recommendations(check: &ApiCheck) -> Vec<String> {
    let mut advice = Vec::new();

    if !check.success {
        advice.push("服务器可能暂时不可用，请稍后重试".to_string());
        advice.push("检查服务器地址是否正确".to_string());
    } else if check.response_time_ms.unwrap_or_default() > SLOW_RESPONSE_MS {
        advice.push("网络连接较慢，建议检查网络质量".to_string());
    }

    advice
}
