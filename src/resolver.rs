//! Resolver - turns raw references into typed, deduplicated edges
//!
//! The relationship label is a pure function of the (source type, target
//! type) pair; unmapped pairs become `traces-to`. Edges are identified by
//! `(source, target, type)` and the first provenance seen is kept.
//!
//! # Examples
//!
//! ```
//! use tracegraph::models::{RawReference, RelationshipType};
//! use tracegraph::resolver::resolve;
//!
//! let edges = resolve(&[
//!     RawReference::new("UC-002", "REQ-SEC-001", "spec/uc.md", 4),
//!     RawReference::new("UC-002", "REQ-SEC-001", "spec/other.md", 9),
//! ]);
//! assert_eq!(edges.len(), 1);
//! assert_eq!(edges.as_slice()[0].kind, RelationshipType::Implements);
//! assert_eq!(edges.as_slice()[0].source_file, "spec/uc.md");
//! ```

use std::collections::HashSet;

use crate::grammar;
use crate::models::{ArtifactType, CommitRef, RawReference, Relationship, RelationshipType};
use crate::registry::ArtifactRegistry;

/// Provenance recorded on commit edges
pub const COMMIT_SOURCE_FILE: &str = "git-log";

/// Relationship label for a (source type, target type) pair
#[must_use]
pub const fn relationship_type(source: ArtifactType, target: ArtifactType) -> RelationshipType {
    use ArtifactType::{
        Api, Behavior, Decision, Invariant, NonFunctional, Phase, Requirement, Task, UseCase,
        Workflow,
    };
    match (source, target) {
        (UseCase, Requirement) => RelationshipType::Implements,
        (Workflow, Api) => RelationshipType::Orchestrates,
        (Behavior, Requirement | UseCase) => RelationshipType::Verifies,
        (Invariant, Requirement) => RelationshipType::Guarantees,
        (Decision, Requirement | NonFunctional) => RelationshipType::Decides,
        (Task, Phase) => RelationshipType::Decomposes,
        (Task, UseCase | Api | Invariant) => RelationshipType::ImplementedBy,
        (Phase, UseCase | Api) => RelationshipType::ReadsFrom,
        _ => RelationshipType::TracesTo,
    }
}

/// Insertion-ordered edge list, unique by `(source, target, type)`
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<Relationship>,
    seen: HashSet<(String, String, RelationshipType)>,
}

impl EdgeSet {
    /// Create an empty edge set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge unless its identity is already present
    ///
    /// Returns `true` if the edge was added.
    pub fn insert(&mut self, edge: Relationship) -> bool {
        let key = (edge.source.clone(), edge.target.clone(), edge.kind);
        if !self.seen.insert(key) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Number of edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether there are no edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[Relationship] {
        &self.edges
    }

    /// Consume the set, keeping insertion order
    #[must_use]
    pub fn into_vec(self) -> Vec<Relationship> {
        self.edges
    }
}

/// Resolve raw references into typed edges
///
/// References whose source or target has no known type are dropped.
#[must_use]
pub fn resolve(references: &[RawReference]) -> EdgeSet {
    let mut edges = EdgeSet::new();
    for reference in references {
        let (Some(source), Some(target)) =
            (grammar::classify(&reference.source), grammar::classify(&reference.target))
        else {
            continue;
        };
        edges.insert(Relationship {
            source: reference.source.clone(),
            target: reference.target.clone(),
            kind: relationship_type(source, target),
            source_file: reference.file.clone(),
            line: reference.line,
        });
    }
    edges
}

/// Add `implemented-by-commit` edges from each commit's short hash to the
/// defined artifacts its `Refs:` trailer names
pub fn add_commit_edges(edges: &mut EdgeSet, commits: &[CommitRef], registry: &ArtifactRegistry) {
    for commit in commits {
        for id in commit.ref_ids.iter().filter(|id| registry.contains(id)) {
            edges.insert(Relationship {
                source: commit.sha.clone(),
                target: id.clone(),
                kind: RelationshipType::ImplementedByCommit,
                source_file: COMMIT_SOURCE_FILE.to_string(),
                line: 0,
            });
        }
    }
}
