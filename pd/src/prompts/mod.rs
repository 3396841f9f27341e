//! Prompt system
//!
//! The section catalog, the prompt composer, and `.pmt` template loading.
//!
//! Template loading chain:
//! 1. `.plandraft/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (working-directory default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

mod composer;
pub mod embedded;
mod loader;
mod sections;

pub use composer::{ComposeContext, Composer, InteractionMode, ReferenceDoc, Role, Turn};
pub use loader::PromptLoader;
pub use sections::Section;
