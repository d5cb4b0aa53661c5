use async_trait::async_trait;

use crate::{GenerateRequest, RawResponse};
use promptgen_types::PromptgenError;

// ---------------------------------------------------------------------------
// GenerateTransport
// ---------------------------------------------------------------------------

/// Carries one `GenerateRequest` to the endpoint and hands back the raw reply.
///
/// Implementations only move bytes. Status and body classification happens in
/// the controller so every transport is judged the same way. A failure to get
/// any response at all is reported as `PromptgenError::Transport`.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn send(&self, request: &GenerateRequest) -> Result<RawResponse, PromptgenError>;
    fn name(&self) -> &str;
}

