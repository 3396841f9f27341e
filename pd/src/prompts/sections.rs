//! Business-plan section catalog
//!
//! The six fixed sections of the government-grant business plan. The set is
//! closed and defined at compile time; identifiers arriving from callers
//! that match nothing degrade to an empty instruction block at the loader
//! rather than failing the exchange.

use tracing::debug;

/// One of the six fixed sections of the business-plan document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// 일반현황
    GeneralInfo,
    /// 개요(요약)
    Overview,
    /// 1. 문제 인식 (Problem)
    Problem,
    /// 2. 실현 가능성 (Solution)
    Solution,
    /// 3. 성장전략 (Scale-up)
    Growth,
    /// 4. 팀 구성 (Team)
    Team,
}

impl Section {
    /// All sections in document order
    pub const ALL: [Section; 6] = [
        Section::GeneralInfo,
        Section::Overview,
        Section::Problem,
        Section::Solution,
        Section::Growth,
        Section::Team,
    ];

    /// Parse a section from its wire identifier
    pub fn from_id(id: &str) -> Option<Self> {
        debug!(%id, "Section::from_id: called");
        match id {
            "general-info" => Some(Self::GeneralInfo),
            "overview" => Some(Self::Overview),
            "problem" => Some(Self::Problem),
            "solution" => Some(Self::Solution),
            "growth" => Some(Self::Growth),
            "team" => Some(Self::Team),
            _ => {
                debug!(%id, "Section::from_id: no match, returning None");
                None
            }
        }
    }

    /// Wire identifier for this section
    pub fn id(&self) -> &'static str {
        match self {
            Self::GeneralInfo => "general-info",
            Self::Overview => "overview",
            Self::Problem => "problem",
            Self::Solution => "solution",
            Self::Growth => "growth",
            Self::Team => "team",
        }
    }

    /// Display title for this section
    pub fn title(&self) -> &'static str {
        match self {
            Self::GeneralInfo => "일반현황",
            Self::Overview => "개요(요약)",
            Self::Problem => "문제 인식 (Problem)",
            Self::Solution => "실현 가능성 (Solution)",
            Self::Growth => "성장전략 (Scale-up)",
            Self::Team => "팀 구성 (Team)",
        }
    }

    /// Evaluation weight annotation, where the grant rubric defines one
    pub fn weight(&self) -> Option<&'static str> {
        match self {
            Self::GeneralInfo | Self::Overview => None,
            Self::Problem => Some("25~30점"),
            Self::Solution => Some("30~35점"),
            Self::Growth => Some("25~30점"),
            Self::Team => Some("20~25점"),
        }
    }

    /// Template name of this section's instruction block
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::GeneralInfo => "section-general-info",
            Self::Overview => "section-overview",
            Self::Problem => "section-problem",
            Self::Solution => "section-solution",
            Self::Growth => "section-growth",
            Self::Team => "section-team",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
