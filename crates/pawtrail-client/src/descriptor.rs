//! Request descriptor

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry their fields in the query string.
    pub fn uses_query(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(format!("Unsupported method: {}", s)),
        }
    }
}

/// File upload sent as multipart form data.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPart {
    pub file: PathBuf,
    /// Form field the file is attached under
    pub field_name: String,
    pub form: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Map<String, Value>),
    Upload(UploadPart),
}

#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Path relative to the client's base URL
    pub path: String,
    pub method: Method,
    pub body: RequestBody,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Additional attempts after the first, for network-level failures only
    pub max_retries: u32,
    attempt: u32,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: RequestBody::Json(Map::new()),
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            attempt: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Multipart upload. Single attempt unless `with_max_retries` says
    /// otherwise: the upload endpoint stores a new file per call.
    pub fn upload(
        path: impl Into<String>,
        file: impl Into<PathBuf>,
        field_name: impl Into<String>,
    ) -> Self {
        let mut descriptor = Self::new(Method::Post, path);
        descriptor.body = RequestBody::Upload(UploadPart {
            file: file.into(),
            field_name: field_name.into(),
            form: BTreeMap::new(),
        });
        descriptor.max_retries = 0;
        descriptor
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Add a field to the JSON body, or a form field for uploads.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        match &mut self.body {
            RequestBody::Json(map) => {
                map.insert(key.into(), value);
            }
            RequestBody::Upload(part) => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                part.form.insert(key.into(), text);
            }
        }
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Number of attempts dispatched so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_upload(&self) -> bool {
        matches!(self.body, RequestBody::Upload(_))
    }

    pub(crate) fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }
}
