//! Artifact model
//!
//! An artifact is a uniquely identified documented unit: a requirement, a use
//! case, a task, and so on. The first definition of an id wins; every later
//! occurrence is a reference.

use serde::{Deserialize, Serialize};

use super::evidence::{CodeRef, CommitRef, TestRef};

/// The closed set of artifact kinds, keyed by id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactType {
    /// Requirement (`REQ-SEC-001`, `REQ-001`)
    #[serde(rename = "REQ")]
    Requirement,
    /// Use case (`UC-001`)
    #[serde(rename = "UC")]
    UseCase,
    /// Workflow (`WF-001`)
    #[serde(rename = "WF")]
    Workflow,
    /// API contract, numeric or named (`API-001`, `API-pdf-reader`)
    #[serde(rename = "API")]
    Api,
    /// Behavior scenario (`BDD-extraction`)
    #[serde(rename = "BDD")]
    Behavior,
    /// Invariant (`INV-EXT-001`, `INV-001`)
    #[serde(rename = "INV")]
    Invariant,
    /// Architecture decision (`ADR-001`)
    #[serde(rename = "ADR")]
    Decision,
    /// Non-functional requirement (`NFR-001`)
    #[serde(rename = "NFR")]
    NonFunctional,
    /// Release note (`RN-001`)
    #[serde(rename = "RN")]
    ReleaseNote,
    /// Plan phase (`FASE-3`)
    #[serde(rename = "FASE")]
    Phase,
    /// Task (`TASK-F3-012`)
    #[serde(rename = "TASK")]
    Task,
}

impl ArtifactType {
    /// Every artifact type, in prefix-table order
    pub const ALL: [Self; 11] = [
        Self::Requirement,
        Self::UseCase,
        Self::Workflow,
        Self::Api,
        Self::Behavior,
        Self::Invariant,
        Self::Decision,
        Self::NonFunctional,
        Self::ReleaseNote,
        Self::Phase,
        Self::Task,
    ];

    /// The id prefix code (`REQ`, `UC`, ...)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Requirement => "REQ",
            Self::UseCase => "UC",
            Self::Workflow => "WF",
            Self::Api => "API",
            Self::Behavior => "BDD",
            Self::Invariant => "INV",
            Self::Decision => "ADR",
            Self::NonFunctional => "NFR",
            Self::ReleaseNote => "RN",
            Self::Phase => "FASE",
            Self::Task => "TASK",
        }
    }

    /// Pipeline stage that produces artifacts of this type
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::Requirement => Stage::RequirementsEngineer,
            Self::Phase => Stage::PlanArchitect,
            Self::Task => Stage::TaskGenerator,
            Self::UseCase
            | Self::Workflow
            | Self::Api
            | Self::Behavior
            | Self::Invariant
            | Self::Decision
            | Self::NonFunctional
            | Self::ReleaseNote => Stage::SpecificationsEngineer,
        }
    }

    /// Whether ids of this type may carry a category segment (`REQ-SEC-001`)
    #[must_use]
    pub const fn has_category(self) -> bool {
        matches!(self, Self::Requirement | Self::Invariant)
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.code() == upper)
            .ok_or_else(|| format!("Invalid artifact type: {s}"))
    }
}

/// Pipeline stage an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Requirements elicitation
    RequirementsEngineer,
    /// Specification writing (use cases, APIs, scenarios, ...)
    SpecificationsEngineer,
    /// Specification audit
    SpecAuditor,
    /// Test planning
    TestPlanner,
    /// Phase planning
    PlanArchitect,
    /// Task breakdown
    TaskGenerator,
    /// Task implementation
    TaskImplementer,
}

impl Stage {
    /// Fixed order in which stages are reported
    pub const ORDER: [Self; 7] = [
        Self::RequirementsEngineer,
        Self::SpecificationsEngineer,
        Self::SpecAuditor,
        Self::TestPlanner,
        Self::PlanArchitect,
        Self::TaskGenerator,
        Self::TaskImplementer,
    ];

    /// Stage name as it appears in pipeline snapshots
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequirementsEngineer => "requirements-engineer",
            Self::SpecificationsEngineer => "specifications-engineer",
            Self::SpecAuditor => "spec-auditor",
            Self::TestPlanner => "test-planner",
            Self::PlanArchitect => "plan-architect",
            Self::TaskGenerator => "task-generator",
            Self::TaskImplementer => "task-implementer",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority inferred from text near a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// MoSCoW "Must Have"
    #[serde(rename = "Must Have")]
    MustHave,
    /// MoSCoW "Should Have"
    #[serde(rename = "Should Have")]
    ShouldHave,
    /// MoSCoW "Could Have"
    #[serde(rename = "Could Have")]
    CouldHave,
    /// MoSCoW "Won't Have"
    #[serde(rename = "Won't Have")]
    WontHave,
    /// Priority column "Critical"
    Critical,
    /// Priority column "High"
    High,
    /// Priority column "Medium"
    Medium,
    /// Priority column "Low"
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MustHave => write!(f, "Must Have"),
            Self::ShouldHave => write!(f, "Should Have"),
            Self::CouldHave => write!(f, "Could Have"),
            Self::WontHave => write!(f, "Won't Have"),
            Self::Critical => write!(f, "Critical"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "must have" => Ok(Self::MustHave),
            "should have" => Ok(Self::ShouldHave),
            "could have" => Ok(Self::CouldHave),
            "won't have" => Ok(Self::WontHave),
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

/// Requirement classification (requirements only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Business domain from the category token (`Security & Auth`, `Other`, ...)
    pub business_domain: String,
    /// Technical layer from linked task phases (`Backend`, `Unknown`, ...)
    pub technical_layer: String,
    /// Functional category (`Functional`, `Security`, ...)
    pub functional_category: String,
}

/// A defined artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Unique identifier, trimmed
    pub id: String,

    /// Artifact kind
    #[serde(rename = "type")]
    pub kind: ArtifactType,

    /// Category token from the id's middle segment (`SEC` in `REQ-SEC-001`)
    pub category: Option<String>,

    /// Title taken from the defining heading, table row or file
    pub title: String,

    /// Defining file, project-relative with forward slashes
    pub file: String,

    /// Defining line (1-based)
    pub line: usize,

    /// Priority inferred from nearby text
    pub priority: Option<Priority>,

    /// Pipeline stage, derived from the type
    pub stage: Stage,

    /// Domain/layer/category, set for requirements after classification
    pub classification: Option<Classification>,

    /// Source code references naming this artifact
    #[serde(default)]
    pub code_refs: Vec<CodeRef>,

    /// Test references naming this artifact
    #[serde(default)]
    pub test_refs: Vec<TestRef>,

    /// Commits naming this artifact
    #[serde(default)]
    pub commit_refs: Vec<CommitRef>,
}

impl Artifact {
    /// Create an artifact with no evidence or classification attached yet
    #[must_use]
    pub fn new(id: String, kind: ArtifactType, title: String, file: String, line: usize) -> Self {
        let category = crate::grammar::category(&id, kind);
        Self {
            id,
            kind,
            category,
            title,
            file,
            line,
            priority: None,
            stage: kind.stage(),
            classification: None,
            code_refs: Vec::new(),
            test_refs: Vec::new(),
            commit_refs: Vec::new(),
        }
    }

    /// Set the inferred priority
    #[must_use]
    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// Whether this artifact is a requirement
    #[must_use]
    pub fn is_requirement(&self) -> bool {
        self.kind == ArtifactType::Requirement
    }
}
