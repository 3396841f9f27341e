//! PlanDraft - guided business-plan drafting engine
//!
//! PlanDraft walks a founder through a government-grant business plan via
//! multi-turn conversation with a generative model. The orchestration core
//! composes one deterministic instruction per request from a fixed persona,
//! a section questionnaire, optional reference material, and the caller's
//! conversation history, then streams the model's answer back as discrete
//! events.
//!
//! # Core Concepts
//!
//! - **Stateless requests**: the caller supplies the history every call;
//!   nothing is persisted between exchanges
//! - **Total catalog lookup**: an unknown section degrades to an empty
//!   instruction block instead of aborting a conversation
//! - **In-band failure**: streaming errors become a terminal event inside
//!   the stream, never a transport-level exception
//!
//! # Modules
//!
//! - [`prompts`] - Section catalog, prompt composer, and template loading
//! - [`session`] - Streaming session runner and wire framing
//! - [`llm`] - Generative-model client trait and Gemini implementation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod llm;
pub mod prompts;
pub mod session;

// Re-export commonly used types
pub use config::{ComposeConfig, Config, LlmConfig};
pub use llm::{CompletionRequest, GeminiClient, LlmClient, LlmError, create_client};
pub use prompts::{ComposeContext, Composer, InteractionMode, PromptLoader, ReferenceDoc, Role, Section, Turn};
pub use session::{DONE_FRAME, SessionRunner, StreamEvent, sse_frames};
