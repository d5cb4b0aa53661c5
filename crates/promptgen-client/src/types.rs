use std::str::FromStr;
use std::time::Duration;

use promptgen_types::PromptgenError;
use serde::{Deserialize, Serialize};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Path of the generation endpoint, relative to the base URL.
pub const GENERATE_PATH: &str = "/generate";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of a `POST /generate` request. The prompt is the only field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// What came back over the wire, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, e.g. "Internal Server Error".
    pub reason: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(String::from),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `"500 Internal Server Error"`, or just the code when no reason is known.
    pub fn status_text(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// How the request body is encoded. The declared content type always follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Json,
    Form,
}

impl Encoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            Encoding::Json => "application/json",
            Encoding::Form => "application/x-www-form-urlencoded",
        }
    }
}

impl FromStr for Encoding {
    type Err = PromptgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Encoding::Json),
            "form" | "urlencoded" => Ok(Encoding::Form),
            _ => Err(PromptgenError::Config(format!(
                "unknown encoding '{s}' (expected json or form)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub encoding: Encoding,
    /// `None` leaves timing to the HTTP client's defaults.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            encoding: Encoding::default(),
            timeout: None,
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `PROMPTGEN_URL`, `PROMPTGEN_ENCODING` and `PROMPTGEN_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PromptgenError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PromptgenError> {
        let base_url = lookup("PROMPTGEN_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);

        if let Some(raw) = lookup("PROMPTGEN_ENCODING") {
            config.encoding = raw.parse()?;
        }

        if let Some(raw) = lookup("PROMPTGEN_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PromptgenError::Config(format!("PROMPTGEN_TIMEOUT_SECS is not a number: '{raw}'"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Absolute URL of the generation endpoint.
    pub fn endpoint(&self) -> Result<reqwest::Url, PromptgenError> {
        let base = self.base_url.trim().trim_end_matches('/');
        let url = reqwest::Url::parse(&format!("{base}{GENERATE_PATH}"))
            .map_err(|e| PromptgenError::Config(format!("invalid base URL '{base}': {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(PromptgenError::Config(format!(
                "unsupported URL scheme '{other}'"
            ))),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
