//! Prompt loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::Section;
use super::embedded;

/// Loads and renders prompt templates
///
/// Template loading chain:
/// 1. `.plandraft/prompts/{name}.pmt` (user override)
/// 2. `prompts/{name}.pmt` (working-directory default)
/// 3. Embedded fallback in code
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.plandraft/prompts/`)
    user_dir: Option<PathBuf>,
    /// Working-directory default (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".plandraft/prompts");
        let repo_dir = root.join("prompts");

        let user_dir_exists = user_dir.exists();
        let repo_dir_exists = repo_dir.exists();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "PromptLoader::new: checking directories"
        );

        Self {
            hbs: Self::engine(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
            repo_dir: if repo_dir_exists { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    // Prompts are plain text, not HTML; leave user content untouched.
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.plandraft/prompts/{name}.pmt`
    /// 2. Working-directory default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(ref repo_dir) = self.repo_dir {
            let path = repo_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in working directory");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        debug!("PromptLoader::load_template: trying embedded fallback");
        if let Some(content) = embedded::get_embedded(name) {
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Get the persona block
    pub fn persona(&self) -> Result<String> {
        debug!("PromptLoader::persona: called");
        self.load_template("persona")
    }

    /// Get the instruction block for a section identifier
    ///
    /// Total: an unknown identifier yields an empty block, degrading the
    /// exchange instead of aborting it.
    pub fn section_block(&self, id: &str) -> String {
        debug!(%id, "PromptLoader::section_block: called");
        let Some(section) = Section::from_id(id) else {
            debug!(%id, "PromptLoader::section_block: unknown section, empty block");
            return String::new();
        };

        match self.load_template(section.template_name()) {
            Ok(block) => block,
            Err(e) => {
                debug!(%id, error = %e, "PromptLoader::section_block: load failed, empty block");
                String::new()
            }
        }
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
