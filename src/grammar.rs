//! Identifier grammar and classifier
//!
//! Every artifact id has the shape `<PREFIX>-<suffix>`:
//!
//! ```text
//! REQ-SEC-001  REQ-001a   requirement (optional category, optional trailing letter)
//! UC-001  WF-001  ADR-001  NFR-001  RN-001
//! API-001  API-pdf-reader  BDD-extraction   named ids
//! INV-EXT-001  INV-001    invariant (optional category)
//! FASE-3                  phase
//! TASK-F3-012             task in phase 3
//! ```
//!
//! Definition patterns (headings, filenames, table rows) are ordered tables:
//! the first pattern that matches wins, so the category-qualified shapes are
//! listed before the plain numeric ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ArtifactType;

/// Prefixes of id-looking audit codes that are never artifacts
pub const EXCLUDED_PREFIXES: [&str; 11] = [
    "SEC-", "SIL-", "SEM-", "CON-", "INC-", "REF-", "AMB-", "DEC-", "IMP-", "CONTR-", "ALTO-",
];

/// Versioned API paths (`API-v1`) look like named API ids but are not
const VERSIONED_API_PREFIX: &str = "API-v";

/// Alternation of every id shape, unanchored
const ID_ALTERNATION: &str = r"REQ-[A-Z]*-?\d{3,4}[a-z]?|UC-\d{3,4}|WF-\d{3,4}|API-[a-zA-Z][a-zA-Z0-9-]*|BDD-[a-zA-Z0-9][a-zA-Z0-9-]*|INV-[A-Z]*-?\d{3,4}|ADR-\d{3,4}|NFR-\d{3,4}|RN-\d{3,4}|FASE-\d{1,2}|TASK-F\d{1,2}-\d{3,4}";

/// Separator allowed between a heading id and its title
const SEPARATOR: &str = r"[:\x{2014}\x{2013}-]?";

static ID_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{ID_ALTERNATION})$")).expect("id grammar is a valid regex")
});

/// Maximal runs of id characters; ids never extend past a run
static ID_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9-]+").expect("id run is a valid regex"));

static CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:REQ|INV)-([A-Z]+)-\d").expect("category pattern is a valid regex")
});

static PHASE_OF_TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TASK-F(\d+)-").expect("task phase pattern is a valid regex"));

static ANY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.*)").expect("heading pattern is a valid regex"));

static BRACKET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[.*?\]\s*$").expect("bracket pattern is a valid regex"));

/// One entry of an ordered definition table
#[derive(Debug)]
pub struct DefinitionPattern {
    /// Type registered when this pattern matches
    pub kind: ArtifactType,
    regex: Regex,
}

impl DefinitionPattern {
    fn new(kind: ArtifactType, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("definition pattern is a valid regex"),
        }
    }

    /// The underlying pattern source
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn heading(kind: ArtifactType, id: &str) -> DefinitionPattern {
    DefinitionPattern::new(kind, &format!(r"(?i)^(#{{1,6}})\s+({id})\s*{SEPARATOR}\s*(.*)"))
}

static HEADING_PATTERNS: LazyLock<Vec<DefinitionPattern>> = LazyLock::new(|| {
    use ArtifactType::{
        Api, Behavior, Decision, Invariant, NonFunctional, Phase, ReleaseNote, Requirement, Task,
        UseCase, Workflow,
    };
    vec![
        heading(Requirement, r"REQ-[A-Z]+-\d{3,4}[a-z]?"),
        heading(Requirement, r"REQ-\d{3,4}"),
        heading(UseCase, r"UC-\d{3,4}"),
        heading(Workflow, r"WF-\d{3,4}"),
        heading(Api, r"API-[a-zA-Z][a-zA-Z0-9-]*"),
        heading(Api, r"API-\d{3,4}"),
        heading(Behavior, r"BDD-[a-zA-Z0-9][a-zA-Z0-9-]*"),
        heading(Invariant, r"INV-[A-Z]+-\d{3,4}"),
        heading(Invariant, r"INV-\d{3,4}"),
        heading(Decision, r"ADR-\d{3,4}"),
        heading(NonFunctional, r"NFR-\d{3,4}"),
        heading(ReleaseNote, r"RN-\d{3,4}"),
        heading(Phase, r"FASE-\d{1,2}"),
        heading(Task, r"TASK-F\d{1,2}-\d{3,4}"),
    ]
});

static FILENAME_PATTERNS: LazyLock<Vec<DefinitionPattern>> = LazyLock::new(|| {
    vec![
        DefinitionPattern::new(ArtifactType::UseCase, r"(?i)^(UC-\d{3,4})"),
        DefinitionPattern::new(ArtifactType::Workflow, r"(?i)^(WF-\d{3,4})"),
        DefinitionPattern::new(ArtifactType::Api, r"(?i)^(API-[a-zA-Z][a-zA-Z0-9-]*?)\.md$"),
        DefinitionPattern::new(ArtifactType::Decision, r"(?i)^(ADR-\d{3,4})"),
        DefinitionPattern::new(ArtifactType::Behavior, r"(?i)^(BDD-[a-zA-Z0-9][a-zA-Z0-9-]*?)\.md$"),
    ]
});

fn table(kind: ArtifactType, id: &str) -> DefinitionPattern {
    DefinitionPattern::new(kind, &format!(r"\|\s*({id})\s*\|"))
}

static TABLE_PATTERNS: LazyLock<Vec<DefinitionPattern>> = LazyLock::new(|| {
    vec![
        table(ArtifactType::Requirement, r"REQ-[A-Z]+-\d{3,4}[a-z]?"),
        table(ArtifactType::Requirement, r"REQ-\d{3,4}"),
        table(ArtifactType::Invariant, r"INV-[A-Z]+-\d{3,4}"),
        table(ArtifactType::Invariant, r"INV-\d{3,4}"),
        table(ArtifactType::NonFunctional, r"NFR-\d{3,4}"),
        table(ArtifactType::ReleaseNote, r"RN-\d{3,4}"),
    ]
});

/// Ordered heading definition patterns, most specific first
#[must_use]
pub fn heading_patterns() -> &'static [DefinitionPattern] {
    &HEADING_PATTERNS
}

/// Ordered filename definition patterns
#[must_use]
pub fn filename_patterns() -> &'static [DefinitionPattern] {
    &FILENAME_PATTERNS
}

/// Ordered table-row definition patterns
#[must_use]
pub fn table_patterns() -> &'static [DefinitionPattern] {
    &TABLE_PATTERNS
}

/// A definition found in a heading line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Type of the matching pattern
    pub kind: ArtifactType,
    /// Normalized id
    pub id: String,
    /// Cleaned title
    pub title: String,
}

/// Match a line against the heading table; first matching pattern wins
#[must_use]
pub fn match_heading(line: &str) -> Option<HeadingMatch> {
    heading_patterns().iter().find_map(|pattern| {
        let caps = pattern.regex.captures(line)?;
        let title = caps.get(3).map_or("", |m| m.as_str().trim());
        Some(HeadingMatch {
            kind: pattern.kind,
            id: normalize(&caps[2]),
            title: clean_title(title),
        })
    })
}

/// Strip a trailing `[...]` annotation and trailing colons from a heading title
#[must_use]
pub fn clean_title(title: &str) -> String {
    let title = BRACKET_SUFFIX.replace(title, "");
    title.trim().trim_end_matches(':').trim().to_string()
}

/// Every id a filename defines, in pattern order
#[must_use]
pub fn match_filename(file_name: &str) -> Vec<(ArtifactType, String)> {
    filename_patterns()
        .iter()
        .filter_map(|p| p.regex.captures(file_name).map(|c| (p.kind, normalize(&c[1]))))
        .collect()
}

/// Every id defined by a table cell on this line, in pattern order
#[must_use]
pub fn match_table_row(line: &str) -> Vec<(ArtifactType, String)> {
    let mut found = Vec::new();
    for pattern in table_patterns() {
        for caps in pattern.regex.captures_iter(line) {
            found.push((pattern.kind, normalize(&caps[1])));
        }
    }
    found
}

/// Title from the first heading among the leading lines, with the id prefix removed
#[must_use]
pub fn title_from_first_heading(lines: &[String], id: &str) -> String {
    let Some(heading) = lines.iter().take(10).find_map(|l| ANY_HEADING.captures(l)) else {
        return String::new();
    };
    let text = heading[1].trim();
    let prefix = Regex::new(&format!(r"^{}\s*{SEPARATOR}\s*", regex::escape(id)));
    match prefix {
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.to_string(),
    }
}

/// Normalize an id for registry lookups
#[must_use]
pub fn normalize(id: &str) -> String {
    id.trim().to_string()
}

/// Classify an id by its prefix
#[must_use]
pub fn classify(id: &str) -> Option<ArtifactType> {
    ArtifactType::ALL
        .into_iter()
        .find(|t| id.strip_prefix(t.code()).is_some_and(|rest| rest.starts_with('-')))
}

/// Category token for requirement and invariant ids (`REQ-SEC-001` -> `SEC`)
#[must_use]
pub fn category(id: &str, kind: ArtifactType) -> Option<String> {
    if !kind.has_category() {
        return None;
    }
    CATEGORY.captures(id).map(|c| c[1].to_string())
}

/// Phase number a task id belongs to (`TASK-F3-012` -> 3)
#[must_use]
pub fn task_phase(id: &str) -> Option<u32> {
    PHASE_OF_TASK.captures(id).and_then(|c| c[1].parse().ok())
}

/// Whether an id-looking token is excluded from references
#[must_use]
pub fn is_excluded(id: &str) -> bool {
    id.starts_with(VERSIONED_API_PREFIX) || EXCLUDED_PREFIXES.iter().any(|p| id.starts_with(p))
}

/// Whether a whole string is a recognized, non-excluded id
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    ID_EXACT.is_match(id) && !is_excluded(id)
}

/// Every recognized id in a piece of text, in order of occurrence
///
/// An id must not be preceded by an ASCII letter and must not be followed by
/// a letter, digit or hyphen. Since the trailing guard forces a match to end
/// where the surrounding run of id characters ends, each run yields at most
/// one id: the longest valid suffix starting at an allowed position.
#[must_use]
pub fn find_ids(text: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for run in ID_RUN.find_iter(text) {
        let run = run.as_str();
        let bytes = run.as_bytes();
        let hit = (0..bytes.len())
            .filter(|&p| bytes[p].is_ascii_uppercase())
            .filter(|&p| p == 0 || !bytes[p - 1].is_ascii_alphabetic())
            .map(|p| &run[p..])
            .find(|candidate| ID_EXACT.is_match(candidate));
        if let Some(id) = hit
            && !is_excluded(id)
        {
            ids.push(normalize(id));
        }
    }
    ids
}
