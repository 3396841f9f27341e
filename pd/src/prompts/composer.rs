//! Prompt composer
//!
//! Assembles the persona block, section instruction block, reference
//! excerpts, and conversation history into one instruction string per
//! interaction mode. Composition is pure string assembly: the composed
//! instruction is built fresh for every request and never cached.

use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::loader::PromptLoader;

/// Heading introducing reference excerpts in the composed instruction
const REFERENCE_HEADING: &str = "### 업로드된 참고 자료:";

/// Which phase of the guided conversation this request drives
///
/// Exactly one mode is active per request. The legacy wire contract used
/// two independent booleans; [`InteractionMode::from_flags`] maps them here
/// with `Start` taking precedence, and everything past the boundary works
/// with the enum only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Open a section with its first question set
    Start,
    /// Analyze the latest answers and keep the dialogue moving
    Continue,
    /// Produce a full section draft from the history so far
    GenerateDraft,
}

impl InteractionMode {
    /// Map the legacy boolean pair to a mode
    ///
    /// Both flags set is a caller error; `Start` wins.
    pub fn from_flags(is_start: bool, generate_draft: bool) -> Self {
        debug!(%is_start, %generate_draft, "InteractionMode::from_flags: called");
        match (is_start, generate_draft) {
            (true, true) => {
                warn!("both start and draft flags set; start takes precedence");
                Self::Start
            }
            (true, false) => Self::Start,
            (false, true) => Self::GenerateDraft,
            (false, false) => Self::Continue,
        }
    }

    /// Template name of this mode's directive template
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Start => "mode-start",
            Self::Continue => "mode-continue",
            Self::GenerateDraft => "mode-draft",
        }
    }
}

/// Speaker of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Dialogue label used when rendering history as prose
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One turn of the caller-owned conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A reference document supplied by the caller for this request only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDoc {
    pub name: String,
    pub content: String,
}

/// Context rendered into the mode directive templates
#[derive(Debug, Clone, Serialize)]
pub struct ComposeContext {
    /// Persona block
    pub persona: String,
    /// Section instruction block (empty for unknown sections)
    pub section: String,
    /// Rendered reference excerpts; `None` contributes nothing
    pub references: Option<String>,
    /// Rendered history (prose for Continue, verbatim JSON for drafts)
    pub conversation: String,
}

/// Assembles composed instructions for the generative model
pub struct Composer {
    loader: PromptLoader,
    reference_char_budget: usize,
}

impl Composer {
    /// Create a composer over the given loader
    pub fn new(loader: PromptLoader, reference_char_budget: usize) -> Self {
        debug!(%reference_char_budget, "Composer::new: called");
        Self {
            loader,
            reference_char_budget,
        }
    }

    /// Compose the instruction for one request
    ///
    /// History ordering is preserved verbatim; turns are never reordered,
    /// deduplicated, or summarized here.
    pub fn compose(
        &self,
        mode: InteractionMode,
        section_id: &str,
        history: &[Turn],
        references: &[ReferenceDoc],
    ) -> Result<String> {
        debug!(
            ?mode,
            %section_id,
            history_len = history.len(),
            reference_count = references.len(),
            "Composer::compose: called"
        );

        let conversation = match mode {
            InteractionMode::Start => String::new(),
            InteractionMode::Continue => render_dialogue(history),
            // Structured serialization keeps turn boundaries unambiguous
            // for the draft, where the model reads the whole history back.
            InteractionMode::GenerateDraft => serde_json::to_string_pretty(history)?,
        };

        let context = ComposeContext {
            persona: self.loader.persona()?,
            section: self.loader.section_block(section_id),
            references: self.render_references(references),
            conversation,
        };

        self.loader.render(mode.template_name(), &context)
    }

    /// Render reference excerpts, or nothing at all when none were supplied
    fn render_references(&self, references: &[ReferenceDoc]) -> Option<String> {
        if references.is_empty() {
            debug!("Composer::render_references: no references, omitting block");
            return None;
        }

        let mut rendered = String::from(REFERENCE_HEADING);
        rendered.push('\n');
        for doc in references {
            let excerpt = truncate_chars(&doc.content, self.reference_char_budget);
            if excerpt.len() < doc.content.len() {
                debug!(name = %doc.name, budget = %self.reference_char_budget, "Composer::render_references: truncated");
            }
            rendered.push_str(&format!("\n**{}:**\n{}\n", doc.name, excerpt));
        }
        Some(rendered)
    }
}

/// Render history as alternating labeled dialogue lines, original order
fn render_dialogue(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Take at most `budget` characters, never splitting a code point
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn composer() -> Composer {
        Composer::new(PromptLoader::embedded_only(), 5000)
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(InteractionMode::from_flags(true, false), InteractionMode::Start);
        assert_eq!(InteractionMode::from_flags(false, true), InteractionMode::GenerateDraft);
        assert_eq!(InteractionMode::from_flags(false, false), InteractionMode::Continue);
        // Caller error: start wins
        assert_eq!(InteractionMode::from_flags(true, true), InteractionMode::Start);
    }

    #[test]
    fn test_start_problem_without_references() {
        let instruction = composer()
            .compose(InteractionMode::Start, "problem", &[], &[])
            .expect("compose should succeed");

        assert!(instruction.contains("Expert AI Consultant"));
        assert!(instruction.contains("문제 인식"));
        assert!(instruction.contains("첫 번째 질문 세트"));
        assert!(!instruction.contains(REFERENCE_HEADING));
    }

    #[test]
    fn test_draft_team_with_reference_and_history() {
        let history = vec![Turn::user("대표자는 개발자입니다")];
        let references = vec![ReferenceDoc {
            name: "notes.txt".to_string(),
            content: "시장 조사 메모".to_string(),
        }];

        let instruction = composer()
            .compose(InteractionMode::GenerateDraft, "team", &history, &references)
            .expect("compose should succeed");

        assert!(instruction.contains("팀 구성"));
        assert!(instruction.contains("**notes.txt:**"));
        assert!(instruction.contains("시장 조사 메모"));
        // History travels as verbatim structured JSON
        assert!(instruction.contains("\"role\": \"user\""));
        assert!(instruction.contains("대표자는 개발자입니다"));
        assert!(instruction.contains("{placeholder}"));
    }

    #[test]
    fn test_continue_renders_labeled_dialogue_in_order() {
        let history = vec![
            Turn::assistant("첫 질문입니다"),
            Turn::user("답변 하나"),
            Turn::assistant("후속 질문"),
            Turn::user("답변 둘"),
        ];

        let instruction = composer()
            .compose(InteractionMode::Continue, "growth", &history, &[])
            .expect("compose should succeed");

        let first = instruction.find("Assistant: 첫 질문입니다").expect("turn 0");
        let second = instruction.find("User: 답변 하나").expect("turn 1");
        let third = instruction.find("Assistant: 후속 질문").expect("turn 2");
        let fourth = instruction.find("User: 답변 둘").expect("turn 3");

        assert!(first < second && second < third && third < fourth);
    }

    #[test]
    fn test_unknown_section_degrades_to_empty_block() {
        let instruction = composer()
            .compose(InteractionMode::Start, "no-such-section", &[], &[])
            .expect("compose should succeed despite unknown section");

        assert!(instruction.contains("Expert AI Consultant"));
        assert!(instruction.contains("첫 번째 질문 세트"));
    }

    #[test]
    fn test_reference_truncated_at_budget_keeps_label() {
        let content = format!("{}TRUNCATION-MARKER", "a".repeat(5000));
        let references = vec![ReferenceDoc {
            name: "huge.pdf".to_string(),
            content,
        }];

        let instruction = composer()
            .compose(InteractionMode::Start, "problem", &[], &references)
            .expect("compose should succeed");

        assert!(instruction.contains("**huge.pdf:**"));
        assert!(instruction.contains(&"a".repeat(5000)));
        assert!(!instruction.contains("TRUNCATION-MARKER"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Multi-byte content one past the budget must not panic or split
        let content = "한".repeat(5001);
        let truncated = truncate_chars(&content, 5000);

        assert_eq!(truncated.chars().count(), 5000);
        assert!(truncated.ends_with('한'));
    }

    #[test]
    fn test_short_reference_not_truncated() {
        let content = "짧은 메모";
        assert_eq!(truncate_chars(content, 5000), content);
    }

    #[test]
    fn test_each_reference_gets_its_own_budget() {
        let references = vec![
            ReferenceDoc {
                name: "a.txt".to_string(),
                content: "x".repeat(6000),
            },
            ReferenceDoc {
                name: "b.txt".to_string(),
                content: "전체 유지되는 내용".to_string(),
            },
        ];

        let instruction = composer()
            .compose(InteractionMode::Continue, "solution", &[], &references)
            .expect("compose should succeed");

        assert!(instruction.contains("**a.txt:**"));
        assert!(instruction.contains("**b.txt:**"));
        assert!(instruction.contains("전체 유지되는 내용"));
        assert!(!instruction.contains(&"x".repeat(6000)));
    }

    proptest! {
        #[test]
        fn prop_continue_preserves_history_order(contents in proptest::collection::vec("[a-z]{1,12}", 1..8)) {
            let history: Vec<Turn> = contents
                .iter()
                .enumerate()
                .map(|(i, content)| {
                    let tagged = format!("turn-{}-{}", i, content);
                    if i % 2 == 0 { Turn::user(tagged) } else { Turn::assistant(tagged) }
                })
                .collect();

            let instruction = composer()
                .compose(InteractionMode::Continue, "overview", &history, &[])
                .expect("compose should succeed");

            let mut cursor = 0;
            for (i, turn) in history.iter().enumerate() {
                let line = format!("{}: {}", turn.role.label(), turn.content);
                let position = instruction[cursor..]
                    .find(&line)
                    .unwrap_or_else(|| panic!("turn {} missing or out of order", i));
                cursor += position + line.len();
            }
        }

        #[test]
        fn prop_reference_contribution_bounded(len in 1usize..7000) {
            let references = vec![ReferenceDoc {
                name: "doc".to_string(),
                content: "y".repeat(len),
            }];

            let instruction = composer()
                .compose(InteractionMode::Start, "team", &[], &references)
                .expect("compose should succeed");

            let longest_run = instruction
                .split(|c: char| c != 'y')
                .map(|run| run.len())
                .max()
                .unwrap_or(0);
            prop_assert_eq!(longest_run, len.min(5000));
        }
    }
}
