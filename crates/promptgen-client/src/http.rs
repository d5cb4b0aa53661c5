use std::error::Error as _;

use async_trait::async_trait;

use crate::{ClientConfig, Encoding, GenerateRequest, GenerateTransport, RawResponse};
use promptgen_types::PromptgenError;

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    encoding: Encoding,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, PromptgenError> {
        let endpoint = config.endpoint()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PromptgenError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            encoding: config.encoding,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

/// Flatten a reqwest error and its sources into one line, so the root cause
/// (e.g. "Connection refused") reaches the display.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn transport_error(err: reqwest::Error) -> PromptgenError {
    PromptgenError::Transport(describe_transport_error(&err))
}

#[async_trait]
impl GenerateTransport for HttpTransport {
    async fn send(&self, request: &GenerateRequest) -> Result<RawResponse, PromptgenError> {
        let builder = self.client.post(self.endpoint.clone());

        // `json` and `form` each set the matching Content-Type header.
        let builder = match self.encoding {
            Encoding::Json => builder.json(request),
            Encoding::Form => builder.form(request),
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            encoding = ?self.encoding,
            prompt_len = request.prompt.len(),
            "POST generate"
        );

        let resp = builder.send().await.map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;

        tracing::debug!(status = status.as_u16(), body_len = body.len(), "generate replied");

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(String::from),
            body,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
