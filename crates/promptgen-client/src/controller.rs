use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use promptgen_types::{Outcome, PromptgenError, RenderState, Severity};

use crate::{GenerateRequest, GenerateTransport, RawResponse, Renderer};

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

/// Turn a raw reply into the generated text or the failure it represents.
pub fn classify_response(raw: &RawResponse) -> Result<String, PromptgenError> {
    if !raw.is_success() {
        return Err(server_error(raw));
    }

    let body: serde_json::Value = serde_json::from_str(&raw.body)?;
    if body.is_null() {
        return Err(PromptgenError::Decode("response body is null".to_string()));
    }

    // An empty or non-string `result` is as unusable as a missing one.
    match body.get("result").and_then(|v| v.as_str()) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(PromptgenError::UnexpectedFormat),
    }
}

fn server_error(raw: &RawResponse) -> PromptgenError {
    let message = match serde_json::from_str::<serde_json::Value>(&raw.body) {
        Ok(body) => match body.get("message").and_then(|v| v.as_str()) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("Server responded with status: {}", raw.status_text()),
        },
        Err(_) => format!("HTTP Error {}", raw.status),
    };

    PromptgenError::Server {
        status: raw.status,
        message,
    }
}

// ---------------------------------------------------------------------------
// SubmissionController
// ---------------------------------------------------------------------------

/// Owns the render state and drives one request/response cycle per `submit`.
///
/// Every call to [`submit`](Self::submit) is tagged with a generation number.
/// Only the most recently triggered submission may write to the display, so a
/// slow earlier request can never overwrite the result of a newer one.
pub struct SubmissionController {
    transport: Box<dyn GenerateTransport>,
    renderer: Box<dyn Renderer>,
    state: Mutex<RenderState>,
    latest: AtomicU64,
}

impl SubmissionController {
    pub fn new(
        transport: impl GenerateTransport + 'static,
        renderer: impl Renderer + 'static,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            renderer: Box::new(renderer),
            state: Mutex::new(RenderState::Idle),
            latest: AtomicU64::new(0),
        }
    }

    /// The state currently on display.
    pub fn state(&self) -> RenderState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Generation number of the most recent submission (0 before any).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Validate, send and render one prompt. Always reaches a terminal state.
    pub async fn submit(&self, prompt: &str) -> Outcome {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            tracing::warn!(generation, "empty prompt, nothing sent");
            return self.finish(generation, RenderState::from(&PromptgenError::EmptyPrompt));
        }

        self.commit(generation, RenderState::Loading);

        let request = GenerateRequest::new(prompt);
        let state = match self.dispatch(&request).await {
            Ok(text) => {
                tracing::info!(generation, result_len = text.len(), "generation succeeded");
                RenderState::Success(text)
            }
            Err(err) => {
                match err.severity() {
                    Severity::Warning => tracing::warn!(generation, error = %err, "generation warning"),
                    Severity::Error => tracing::error!(
                        generation,
                        transport = self.transport.name(),
                        status = ?err.http_status(),
                        error = %err,
                        "generation failed"
                    ),
                }
                RenderState::from(&err)
            }
        };

        self.finish(generation, state)
    }

    async fn dispatch(&self, request: &GenerateRequest) -> Result<String, PromptgenError> {
        let raw = self.transport.send(request).await?;
        classify_response(&raw)
    }

    fn finish(&self, generation: u64, state: RenderState) -> Outcome {
        let rendered = self.commit(generation, state.clone());
        if !rendered {
            tracing::debug!(
                generation,
                latest = self.latest_generation(),
                state = state.label(),
                "stale result dropped"
            );
        }
        Outcome {
            generation,
            state,
            rendered,
        }
    }

    /// Replace the visible state if `generation` is still the latest.
    fn commit(&self, generation: u64, state: RenderState) -> bool {
        let mut current = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.latest.load(Ordering::SeqCst) != generation {
            return false;
        }

        *current = state;
        self.renderer.render(&current);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
