//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Consulting persona, prepended to every composed instruction
pub const PERSONA: &str = include_str!("../../prompts/persona.pmt");

/// Section questionnaires
pub const SECTION_GENERAL_INFO: &str = include_str!("../../prompts/section-general-info.pmt");
pub const SECTION_OVERVIEW: &str = include_str!("../../prompts/section-overview.pmt");
pub const SECTION_PROBLEM: &str = include_str!("../../prompts/section-problem.pmt");
pub const SECTION_SOLUTION: &str = include_str!("../../prompts/section-solution.pmt");
pub const SECTION_GROWTH: &str = include_str!("../../prompts/section-growth.pmt");
pub const SECTION_TEAM: &str = include_str!("../../prompts/section-team.pmt");

/// Mode directive templates, one per interaction mode
pub const MODE_START: &str = include_str!("../../prompts/mode-start.pmt");
pub const MODE_CONTINUE: &str = include_str!("../../prompts/mode-continue.pmt");
pub const MODE_DRAFT: &str = include_str!("../../prompts/mode-draft.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "persona" => Some(PERSONA),
        "section-general-info" => Some(SECTION_GENERAL_INFO),
        "section-overview" => Some(SECTION_OVERVIEW),
        "section-problem" => Some(SECTION_PROBLEM),
        "section-solution" => Some(SECTION_SOLUTION),
        "section-growth" => Some(SECTION_GROWTH),
        "section-team" => Some(SECTION_TEAM),
        "mode-start" => Some(MODE_START),
        "mode-continue" => Some(MODE_CONTINUE),
        "mode-draft" => Some(MODE_DRAFT),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
