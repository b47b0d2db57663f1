//! Coverage engine
//!
//! Requirement traceability is measured against six downstream kinds. For
//! artifact kinds (use cases, behavior scenarios, tasks) a requirement is
//! covered by a direct edge in either direction. For evidence kinds (code,
//! tests, commits) it is covered when it carries the evidence itself or when
//! any artifact one hop away does.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::grammar;
use crate::models::{
    Artifact, ArtifactType, CodeRef, CommitRef, RawReference, Relationship, TestRef,
};
use crate::registry::ArtifactRegistry;

/// Forward and backward neighbour index over an edge list
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    incoming: HashMap<String, BTreeSet<String>>,
    outgoing: HashMap<String, BTreeSet<String>>,
}

impl Adjacency {
    /// Index an edge list
    #[must_use]
    pub fn from_edges(edges: &[Relationship]) -> Self {
        let mut adjacency = Self::default();
        for edge in edges {
            adjacency
                .incoming
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
            adjacency
                .outgoing
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
        adjacency
    }

    /// Sources of edges pointing at `id`, sorted
    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &str> {
        self.incoming.get(id).into_iter().flatten().map(String::as_str)
    }

    /// Targets of edges leaving `id`, sorted
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &str> {
        self.outgoing.get(id).into_iter().flatten().map(String::as_str)
    }

    /// Incoming then outgoing neighbours
    pub fn neighbours(&self, id: &str) -> impl Iterator<Item = &str> {
        self.incoming(id).chain(self.outgoing(id))
    }

    /// Whether `id` is an endpoint of any edge
    #[must_use]
    pub fn has_edges(&self, id: &str) -> bool {
        self.incoming.contains_key(id) || self.outgoing.contains_key(id)
    }
}

/// Kind of evidence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceKind {
    /// Source code tag
    Code,
    /// Test reference
    Test,
    /// Commit trailer
    Commit,
}

/// Evidence records keyed by every id they name, defined or not
#[derive(Debug, Clone, Default)]
pub struct EvidenceIndex {
    code: HashMap<String, Vec<CodeRef>>,
    tests: HashMap<String, Vec<TestRef>>,
    commits: HashMap<String, Vec<CommitRef>>,
}

impl EvidenceIndex {
    /// Index evidence by named id, keeping scan order per id
    #[must_use]
    pub fn build(code: &[CodeRef], tests: &[TestRef], commits: &[CommitRef]) -> Self {
        let mut index = Self::default();
        for record in code {
            for id in &record.ref_ids {
                index.code.entry(id.clone()).or_default().push(record.clone());
            }
        }
        for record in tests {
            for id in &record.ref_ids {
                index.tests.entry(id.clone()).or_default().push(record.clone());
            }
        }
        for commit in commits {
            for id in commit.named_ids() {
                index.commits.entry(id.to_string()).or_default().push(commit.clone());
            }
        }
        index
    }

    /// Whether `id` directly carries evidence of `kind`
    #[must_use]
    pub fn has(&self, kind: EvidenceKind, id: &str) -> bool {
        match kind {
            EvidenceKind::Code => self.code.get(id).is_some_and(|v| !v.is_empty()),
            EvidenceKind::Test => self.tests.get(id).is_some_and(|v| !v.is_empty()),
            EvidenceKind::Commit => self.commits.get(id).is_some_and(|v| !v.is_empty()),
        }
    }

    /// Copy each defined artifact's evidence onto it
    pub fn attach(&self, registry: &mut ArtifactRegistry) {
        for artifact in registry.iter_mut() {
            artifact.code_refs = self.code.get(&artifact.id).cloned().unwrap_or_default();
            artifact.test_refs = self.tests.get(&artifact.id).cloned().unwrap_or_default();
            artifact.commit_refs = self.commits.get(&artifact.id).cloned().unwrap_or_default();
        }
    }
}

/// Something a requirement can be covered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageTarget {
    /// A direct edge to or from an artifact of this type
    Kind(ArtifactType),
    /// Evidence on the requirement or one hop away
    Evidence(EvidenceKind),
}

/// Whether requirement `id` is covered by `target`
#[must_use]
pub fn is_covered(
    id: &str,
    target: CoverageTarget,
    adjacency: &Adjacency,
    evidence: &EvidenceIndex,
) -> bool {
    match target {
        CoverageTarget::Kind(kind) => {
            adjacency.neighbours(id).any(|n| grammar::classify(n) == Some(kind))
        },
        CoverageTarget::Evidence(kind) => {
            evidence.has(kind, id) || adjacency.neighbours(id).any(|n| evidence.has(kind, n))
        },
    }
}

/// Covered count over a total, with a one-decimal percentage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageMetric {
    /// Covered requirements
    pub count: usize,
    /// All requirements
    pub total: usize,
    /// `count / total * 100`, one decimal; zero when there are no requirements
    pub percentage: f64,
}

impl CoverageMetric {
    /// Compute the metric
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(count: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self {
            count,
            total,
            percentage,
        }
    }
}

/// Requirement coverage per downstream kind
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceabilityCoverage {
    /// Linked to a use case
    #[serde(rename = "reqsWithUCs")]
    pub reqs_with_ucs: CoverageMetric,
    /// Linked to a behavior scenario
    #[serde(rename = "reqsWithBDD")]
    pub reqs_with_bdd: CoverageMetric,
    /// Linked to a task
    #[serde(rename = "reqsWithTasks")]
    pub reqs_with_tasks: CoverageMetric,
    /// Code evidence on or next to the requirement
    #[serde(rename = "reqsWithCode")]
    pub reqs_with_code: CoverageMetric,
    /// Test evidence on or next to the requirement
    #[serde(rename = "reqsWithTests")]
    pub reqs_with_tests: CoverageMetric,
    /// Commit evidence on or next to the requirement
    #[serde(rename = "reqsWithCommits")]
    pub reqs_with_commits: CoverageMetric,
}

/// Compute requirement coverage for every downstream kind
#[must_use]
pub fn traceability_coverage(
    registry: &ArtifactRegistry,
    adjacency: &Adjacency,
    evidence: &EvidenceIndex,
) -> TraceabilityCoverage {
    let requirements: Vec<&Artifact> = registry.of_type(ArtifactType::Requirement).collect();
    let total = requirements.len();
    let metric = |target| {
        let count = requirements
            .iter()
            .filter(|r| is_covered(&r.id, target, adjacency, evidence))
            .count();
        CoverageMetric::new(count, total)
    };

    TraceabilityCoverage {
        reqs_with_ucs: metric(CoverageTarget::Kind(ArtifactType::UseCase)),
        reqs_with_bdd: metric(CoverageTarget::Kind(ArtifactType::Behavior)),
        reqs_with_tasks: metric(CoverageTarget::Kind(ArtifactType::Task)),
        reqs_with_code: metric(CoverageTarget::Evidence(EvidenceKind::Code)),
        reqs_with_tests: metric(CoverageTarget::Evidence(EvidenceKind::Test)),
        reqs_with_commits: metric(CoverageTarget::Evidence(EvidenceKind::Commit)),
    }
}

/// Defined ids that are an endpoint of no edge, sorted, at most `limit`
#[must_use]
pub fn orphans(registry: &ArtifactRegistry, adjacency: &Adjacency, limit: usize) -> Vec<String> {
    let orphans: BTreeSet<&str> = registry
        .iter()
        .map(|a| a.id.as_str())
        .filter(|id| !adjacency.has_edges(id))
        .collect();
    orphans.into_iter().take(limit).map(String::from).collect()
}

/// A referenced id that was never defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenReference {
    /// The undefined id
    #[serde(rename = "ref")]
    pub id: String,
    /// File of its first reference
    pub referenced_in: String,
    /// Line of its first reference
    pub line: usize,
}

/// Undefined reference targets, first occurrence each, at most `limit`
#[must_use]
pub fn broken_references(
    registry: &ArtifactRegistry,
    references: &[RawReference],
    limit: usize,
) -> Vec<BrokenReference> {
    let mut seen = HashSet::new();
    references
        .iter()
        .filter(|r| !registry.contains(&r.target) && seen.insert(r.target.as_str()))
        .take(limit)
        .map(|r| BrokenReference {
            id: r.target.clone(),
            referenced_in: r.file.clone(),
            line: r.line,
        })
        .collect()
}
