//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

const PRODUCTION_BASE_URL: &str = "https://pettrailstar.cn";
const LOCAL_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Local,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Local => LOCAL_BASE_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "local" | "dev" => Ok(Environment::Local),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,
    /// Backend base URL; request paths are appended to it
    pub base_url: String,
    /// Where the session token and cached profile are kept
    pub database_path: PathBuf,
    pub request_timeout_ms: u64,
    /// Extra attempts for JSON requests after a network failure
    pub max_retries: u32,
    /// Extra attempts for uploads. Zero unless the backend dedupes uploads.
    pub upload_max_retries: u32,
    pub health_timeout_ms: u64,
}

impl Config {
    pub fn new(environment: Environment, data_dir: PathBuf) -> Self {
        Self {
            environment,
            base_url: environment.base_url().to_string(),
            database_path: data_dir.join("pawtrail.db"),
            request_timeout_ms: 10_000,
            max_retries: 2,
            upload_max_retries: 0,
            health_timeout_ms: 5_000,
        }
    }

    pub fn production() -> Self {
        Self::new(Environment::Production, Self::data_dir())
    }

    pub fn local() -> Self {
        Self::new(Environment::Local, Self::data_dir())
    }

    /// Build from `PAWTRAIL_ENV`, `PAWTRAIL_BASE_URL` and `PAWTRAIL_DATA_DIR`,
    /// falling back to production defaults.
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("PAWTRAIL_ENV") {
            Ok(value) => value.parse().map_err(CoreError::Config)?,
            Err(_) => Environment::Production,
        };
        let data_dir = std::env::var("PAWTRAIL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::data_dir());

        let mut config = Self::new(environment, data_dir);
        if let Ok(base_url) = std::env::var("PAWTRAIL_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("PawTrail"))
            .unwrap_or_else(|| PathBuf::from(".pawtrail"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::production()
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
