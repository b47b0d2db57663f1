//! Evidence records
//!
//! Commits, source-code comments and tests that name artifact ids. Evidence is
//! attached to the ids it names and then propagated one hop to requirements.

use serde::{Deserialize, Serialize};

/// A commit carrying `Task:` and/or `Refs:` trailers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    /// Abbreviated hash
    pub sha: String,
    /// Full 40-character hash
    pub full_sha: String,
    /// Subject line
    pub message: String,
    /// Author name
    pub author: String,
    /// Author date, strict ISO 8601
    pub date: String,
    /// Id from the `Task:` trailer
    pub task_id: Option<String>,
    /// Ids from the `Refs:` trailer
    pub ref_ids: Vec<String>,
}

impl CommitRef {
    /// All ids this commit names: `Refs:` ids followed by the task id, without duplicates
    #[must_use]
    pub fn named_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.ref_ids.len() + 1);
        for id in self.ref_ids.iter().map(String::as_str).chain(self.task_id.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Kind of declaration a code reference was attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// `function` / `async function`
    Function,
    /// `class`
    Class,
    /// `const`
    Const,
    /// `let` / `var`
    Variable,
    /// `interface`
    Interface,
    /// `type`
    Type,
    /// `enum`
    Enum,
    /// No declaration nearby
    #[default]
    Unknown,
}

impl SymbolKind {
    /// Map a declaration keyword to its kind
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "function" => Self::Function,
            "class" => Self::Class,
            "const" => Self::Const,
            "let" | "var" => Self::Variable,
            "interface" => Self::Interface,
            "type" => Self::Type,
            "enum" => Self::Enum,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
            Self::Const => write!(f, "const"),
            Self::Variable => write!(f, "variable"),
            Self::Interface => write!(f, "interface"),
            Self::Type => write!(f, "type"),
            Self::Enum => write!(f, "enum"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A `Refs:` tag or trailing id comment in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRef {
    /// Project-relative file
    pub file: String,
    /// Line of the tag (1-based)
    pub line: usize,
    /// Nearest declared symbol, or `file:line` when none
    pub symbol: String,
    /// Kind of the attributed symbol
    pub symbol_type: SymbolKind,
    /// Ids named by the tag
    pub ref_ids: Vec<String>,
}

/// A test that names artifact ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRef {
    /// Project-relative file
    pub file: String,
    /// Line of the test declaration (1-based)
    pub line: usize,
    /// `group > description`, the description, or `file:line`
    pub test_name: String,
    /// Test framework label
    pub framework: String,
    /// Ids named by the test
    pub ref_ids: Vec<String>,
}

/// Totals from the code reference scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStats {
    /// Source files visited
    pub total_files: usize,
    /// Declarations found
    pub total_symbols: usize,
    /// References attributed to a declaration
    pub symbols_with_refs: usize,
}

/// Totals from the test reference scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    /// Test files visited
    pub total_test_files: usize,
    /// Test declarations found
    pub total_tests: usize,
    /// Test lines that named at least one id
    pub tests_with_refs: usize,
}

/// Totals over scanned commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    /// Commits found with either trailer
    pub total_commits: usize,
    /// Commits with a non-empty `Refs:` trailer
    pub commits_with_refs: usize,
    /// Commits with a `Task:` trailer
    pub commits_with_tasks: usize,
    /// Distinct task ids across commits
    pub unique_tasks_covered: usize,
}

impl CommitStats {
    /// Compute totals over a commit list
    #[must_use]
    pub fn from_commits(commits: &[CommitRef]) -> Self {
        let tasks: std::collections::BTreeSet<&str> =
            commits.iter().filter_map(|c| c.task_id.as_deref()).collect();
        Self {
            total_commits: commits.len(),
            commits_with_refs: commits.iter().filter(|c| !c.ref_ids.is_empty()).count(),
            commits_with_tasks: commits.iter().filter(|c| c.task_id.is_some()).count(),
            unique_tasks_covered: tasks.len(),
        }
    }
}
