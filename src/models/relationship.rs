//! Relationship model
//!
//! Raw references are what the document scanner sees on a line; relationships
//! are typed, deduplicated edges built from them by the resolver.

use serde::{Deserialize, Serialize};

/// Semantic label of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    /// Use case implements a requirement
    Implements,
    /// Workflow orchestrates an API
    Orchestrates,
    /// Behavior scenario verifies a requirement or use case
    Verifies,
    /// Invariant guarantees a requirement
    Guarantees,
    /// Decision decides a requirement or NFR
    Decides,
    /// Task decomposes a phase
    Decomposes,
    /// Task implements a use case, API or invariant
    ImplementedBy,
    /// Phase reads from a use case or API
    ReadsFrom,
    /// Commit (short hash) implements an artifact
    ImplementedByCommit,
    /// Any other pair
    TracesTo,
}

impl RelationshipType {
    /// Label as serialized in the graph
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Implements => "implements",
            Self::Orchestrates => "orchestrates",
            Self::Verifies => "verifies",
            Self::Guarantees => "guarantees",
            Self::Decides => "decides",
            Self::Decomposes => "decomposes",
            Self::ImplementedBy => "implemented-by",
            Self::ReadsFrom => "reads-from",
            Self::ImplementedByCommit => "implemented-by-commit",
            Self::TracesTo => "traces-to",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An untyped (source, target) pair as found in a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawReference {
    /// Referencing id
    pub source: String,
    /// Referenced id
    pub target: String,
    /// Project-relative file the pair was found in
    pub file: String,
    /// Line the pair was found on (1-based)
    pub line: usize,
}

impl RawReference {
    /// Create a raw reference
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, file: &str, line: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            file: file.to_string(),
            line,
        }
    }
}

/// A typed, deduplicated edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Source id (or short commit hash)
    pub source: String,
    /// Target id
    pub target: String,
    /// Edge label
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    /// Where the edge was first seen (`git-log` for commit edges)
    pub source_file: String,
    /// Line where the edge was first seen (0 for commit edges)
    pub line: usize,
}
