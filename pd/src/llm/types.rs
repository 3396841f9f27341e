//! LLM request types
//!
//! Each request carries one fully composed instruction. There is no
//! conversation state at this layer - the composer folds persona, section
//! guidance, references and history into the instruction string, and every
//! call is independent.

use tracing::debug;

/// A completion request - everything needed for one model call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The composed instruction for this exchange
    pub instruction: String,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request from a composed instruction
    pub fn new(instruction: impl Into<String>, max_tokens: u32) -> Self {
        let instruction = instruction.into();
        debug!(instruction_len = instruction.len(), %max_tokens, "CompletionRequest::new: called");
        Self {
            instruction,
            max_tokens,
        }
    }
}
