//! Shared types and errors for the promptgen client.
//!
//! This crate provides the foundational types used across the other promptgen crates:
//! - `PromptgenError`: unified error taxonomy for a submission
//! - `RenderState`: the single visible outcome of a submission
//! - `Outcome`: what one call to `submit` produced

use serde::{Deserialize, Serialize};

/// Fixed text shown when the prompt is empty after trimming.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a testing idea or scenario.";

/// Fixed text shown when a successful response has no usable `result`.
pub const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Generation complete, but received an unexpected response format.";

/// Shown in place of an error whose message turned out empty.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Unified error type for a single prompt submission.
#[derive(Debug, thiserror::Error)]
pub enum PromptgenError {
    // === Warnings ===
    #[error("{msg}", msg = EMPTY_PROMPT_MESSAGE)]
    EmptyPrompt,

    #[error("{msg}", msg = UNEXPECTED_FORMAT_MESSAGE)]
    UnexpectedFormat,

    // === Errors ===
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Whether a failure is shown as a warning or as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl PromptgenError {
    /// Warnings are contract problems the user can act on; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self {
            PromptgenError::EmptyPrompt | PromptgenError::UnexpectedFormat => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The user-visible text for this failure.
    pub fn display_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// The HTTP status that produced this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PromptgenError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PromptgenError {
    fn from(err: serde_json::Error) -> Self {
        PromptgenError::Decode(err.to_string())
    }
}

/// A convenience alias for `Result<T, PromptgenError>`.
pub type Result<T> = std::result::Result<T, PromptgenError>;

// ---------------------------------------------------------------------------
// RenderState: the one visible outcome
// ---------------------------------------------------------------------------

/// The state of the display region. Each value fully replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum RenderState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Warning(String),
    Error(String),
}

impl RenderState {
    /// `true` for the states that end a submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RenderState::Success(_) | RenderState::Warning(_) | RenderState::Error(_)
        )
    }

    /// The text carried by the state, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            RenderState::Success(t) | RenderState::Warning(t) | RenderState::Error(t) => Some(t),
            RenderState::Idle | RenderState::Loading => None,
        }
    }

    /// Short tag used for logging and for styling the region.
    pub fn label(&self) -> &'static str {
        match self {
            RenderState::Idle => "idle",
            RenderState::Loading => "loading",
            RenderState::Success(_) => "success",
            RenderState::Warning(_) => "warning",
            RenderState::Error(_) => "error",
        }
    }
}

impl From<&PromptgenError> for RenderState {
    fn from(err: &PromptgenError) -> Self {
        match err.severity() {
            Severity::Warning => RenderState::Warning(err.display_message()),
            Severity::Error => RenderState::Error(err.display_message()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome: result of one submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Generation number assigned when the submission was triggered.
    pub generation: u64,
    /// Terminal state this submission reached.
    pub state: RenderState,
    /// Whether `state` was written to the display. `false` when a newer
    /// submission had already been triggered.
    pub rendered: bool,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self.state, RenderState::Success(_))
    }
}
