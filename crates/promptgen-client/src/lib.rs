//! Client side of the prompt generation flow.
//!
//! Provides the `GenerateTransport` trait with its reqwest-backed
//! `HttpTransport`, the `Renderer` trait with a plain-text `TerminalRenderer`,
//! and `SubmissionController`, which validates a prompt, sends it to
//! `POST /generate` and renders exactly one terminal state per submission.

mod controller;
mod http;
mod render;
mod transport;
mod types;

pub use controller::*;
pub use http::HttpTransport;
pub use render::*;
pub use transport::*;
pub use types::*;

pub use promptgen_types::{Outcome, PromptgenError, RenderState, Severity};
