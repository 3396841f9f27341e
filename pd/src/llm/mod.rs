//! LLM client module for PlanDraft
//!
//! Provides the generative-model collaborator boundary: a stateless client
//! trait, the Gemini implementation, and request/error types.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::CompletionRequest;

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Currently only the "gemini" provider is supported.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}
