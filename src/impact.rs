//! Impact analysis
//!
//! Blast radius of changing one artifact: a breadth-first walk over the
//! graph's relationships, bucketed by distance from the changed artifact.
//!
//! ```text
//! depth 1  WILL_BREAK
//! depth 2  LIKELY_AFFECTED
//! depth 3+ MAY_NEED_REVIEW
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::graph::TraceGraph;
use crate::models::{Artifact, ArtifactType, Relationship, RelationshipType};

/// Default traversal depth
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Which way to walk the relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// What this artifact depends on (follow edges from source to target)
    Upstream,
    /// What depends on this artifact (follow edges from target to source)
    #[default]
    Downstream,
}

impl Direction {
    /// Endpoint a relationship is indexed under for this direction
    #[must_use]
    pub fn key(self, rel: &Relationship) -> &str {
        match self {
            Self::Downstream => &rel.target,
            Self::Upstream => &rel.source,
        }
    }

    /// Endpoint a relationship leads to for this direction
    #[must_use]
    pub fn neighbour(self, rel: &Relationship) -> &str {
        match self {
            Self::Downstream => &rel.source,
            Self::Upstream => &rel.target,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upstream" | "up" => Ok(Self::Upstream),
            "downstream" | "down" => Ok(Self::Downstream),
            _ => Err(format!("Invalid direction: {s} (expected upstream or downstream)")),
        }
    }
}

/// Overall risk of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    /// Few artifacts affected
    Low,
    /// More than 2 direct or 10 total
    Medium,
    /// More than 5 direct or 20 total
    High,
}

impl Risk {
    /// Assess risk from the direct and total affected counts
    #[must_use]
    pub const fn assess(direct: usize, total: usize) -> Self {
        if direct > 5 || total > 20 {
            Self::High
        } else if direct > 2 || total > 10 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Label for a distance from the changed artifact
#[must_use]
pub const fn depth_label(depth: usize) -> &'static str {
    match depth {
        0 | 1 => "WILL_BREAK",
        2 => "LIKELY_AFFECTED",
        _ => "MAY_NEED_REVIEW",
    }
}

/// An artifact reached by the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedArtifact {
    /// Artifact id
    pub id: String,
    /// Artifact type
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    /// Title
    pub title: String,
    /// Defining file
    pub file: String,
    /// Label of the relationship it was reached through
    pub via_relationship: RelationshipType,
}

/// Affected artifacts at one distance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Distance from the changed artifact
    pub depth: usize,
    /// Depth label
    pub label: String,
    /// Artifacts at this distance, in discovery order
    pub artifacts: Vec<AffectedArtifact>,
}

/// Result of an impact analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// The changed artifact's id
    pub artifact: String,
    /// Its type
    pub artifact_type: ArtifactType,
    /// Its title
    pub title: String,
    /// Walk direction
    pub direction: Direction,
    /// Depth limit used
    pub max_depth: usize,
    /// Overall risk
    pub risk: Risk,
    /// Affected artifacts over all depths
    pub total_affected: usize,
    /// Non-empty levels, nearest first
    pub by_depth: Vec<DepthLevel>,
    /// Pipeline stages of the affected artifacts, sorted by name
    pub affected_stages: Vec<String>,
}

impl ImpactReport {
    /// Number of artifacts at depth 1
    #[must_use]
    pub fn direct(&self) -> usize {
        self.by_depth.iter().find(|l| l.depth == 1).map_or(0, |l| l.artifacts.len())
    }
}

/// Defined artifacts by id
#[must_use]
pub(crate) fn artifact_index(graph: &TraceGraph) -> HashMap<&str, &Artifact> {
    graph.artifacts.iter().map(|a| (a.id.as_str(), a)).collect()
}

/// Relationships grouped by the endpoint `direction` walks from
#[must_use]
pub(crate) fn relationship_index(
    graph: &TraceGraph,
    direction: Direction,
) -> HashMap<&str, Vec<&Relationship>> {
    let mut index: HashMap<&str, Vec<&Relationship>> = HashMap::new();
    for rel in &graph.relationships {
        index.entry(direction.key(rel)).or_default().push(rel);
    }
    index
}

/// Walk the graph from `id`
///
/// Every node not yet visited is expanded at most once; only defined
/// artifacts are reported, but undefined ids (such as commit hashes) are
/// still walked through.
pub fn analyze(
    graph: &TraceGraph,
    id: &str,
    direction: Direction,
    max_depth: usize,
) -> Result<ImpactReport, AnalysisError> {
    let by_id = artifact_index(graph);
    let root = by_id.get(id).ok_or_else(|| AnalysisError::UnknownArtifact(id.to_string()))?;
    let index = relationship_index(graph, direction);

    let mut visited: HashSet<&str> = HashSet::from([id]);
    let mut current = vec![id];
    let mut by_depth = Vec::new();
    let mut stages: BTreeSet<&'static str> = BTreeSet::new();

    for depth in 1..=max_depth {
        let mut next = Vec::new();
        let mut level = Vec::new();

        for node in current {
            for rel in index.get(node).into_iter().flatten() {
                let neighbour = direction.neighbour(rel);
                if !visited.insert(neighbour) {
                    continue;
                }
                if let Some(artifact) = by_id.get(neighbour) {
                    stages.insert(artifact.stage.as_str());
                    level.push(AffectedArtifact {
                        id: artifact.id.clone(),
                        kind: artifact.kind,
                        title: artifact.title.clone(),
                        file: artifact.file.clone(),
                        via_relationship: rel.kind,
                    });
                }
                next.push(neighbour);
            }
        }

        if !level.is_empty() {
            by_depth.push(DepthLevel {
                depth,
                label: depth_label(depth).to_string(),
                artifacts: level,
            });
        }
        if next.is_empty() {
            break;
        }
        current = next;
    }

    let mut report = ImpactReport {
        artifact: root.id.clone(),
        artifact_type: root.kind,
        title: root.title.clone(),
        direction,
        max_depth,
        risk: Risk::Low,
        total_affected: by_depth.iter().map(|l| l.artifacts.len()).sum(),
        by_depth,
        affected_stages: stages.into_iter().map(String::from).collect(),
    };
    report.risk = Risk::assess(report.direct(), report.total_affected);
    Ok(report)
}
