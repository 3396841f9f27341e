//! LlmClient trait definition

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CompletionRequest, LlmError};

/// Stateless LLM client - each call is independent
///
/// This is the core abstraction for invoking the generative model. No
/// conversation state is maintained between calls: the composed instruction
/// carries everything the model needs, so the client handle is read-only
/// configuration and can be shared across concurrent requests without
/// synchronization.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Streaming completion
    ///
    /// Pushes raw text deltas to the provided channel as they arrive and
    /// returns `Ok(())` once the model signals normal completion. A failed
    /// send means the receiver is gone; implementations stop requesting
    /// further deltas and return `Ok(())` quietly.
    async fn stream(&self, request: CompletionRequest, delta_tx: mpsc::Sender<String>) -> Result<(), LlmError>;
}
