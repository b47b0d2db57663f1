//! Chain tracing
//!
//! Follows every relationship of one artifact in both directions and lays
//! the connected artifacts out along the expected chain:
//!
//! ```text
//! REQ -> UC -> WF -> API -> BDD -> INV -> ADR -> TASK -> COMMIT -> CODE -> TEST
//! ```
//!
//! The COMMIT, CODE and TEST levels are filled from the evidence attached to
//! the connected artifacts. A missing level before the artifact's own, or a
//! missing key level after it, is a break in the chain.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::graph::TraceGraph;
use crate::impact::{Direction, artifact_index, relationship_index};
use crate::models::{Artifact, ArtifactType, Relationship};

/// Chain levels, upstream first
pub const CHAIN: [&str; 11] = [
    "REQ", "UC", "WF", "API", "BDD", "INV", "ADR", "TASK", "COMMIT", "CODE", "TEST",
];

/// Levels after the artifact whose absence counts as a break
const KEY_DOWNSTREAM: [&str; 5] = ["UC", "BDD", "TASK", "CODE", "TEST"];

/// Entries kept per evidence level
pub const EVIDENCE_LIMIT: usize = 20;

/// Relationship label of the traced artifact itself
const SELF_LINK: &str = "self";

/// How complete the chain is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainStatus {
    /// No breaks
    Complete,
    /// One or two breaks
    Partial,
    /// More than two breaks
    Fragmented,
}

impl ChainStatus {
    /// Status for a number of breaks
    #[must_use]
    pub const fn from_breaks(breaks: usize) -> Self {
        match breaks {
            0 => Self::Complete,
            1 | 2 => Self::Partial,
            _ => Self::Fragmented,
        }
    }
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "COMPLETE"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Fragmented => write!(f, "FRAGMENTED"),
        }
    }
}

/// One entry at a chain level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Artifact id, commit hash, or `symbol@file:line`
    pub id: String,
    /// Display title
    pub title: String,
    /// File the entry lives in (the task id for commits)
    pub file: String,
    /// Relationship label it was reached through; absent for evidence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Everything found at one chain level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Level code from [`CHAIN`]
    pub level: String,
    /// Entries at this level
    pub artifacts: Vec<ChainEntry>,
}

/// Result of tracing one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    /// Traced artifact's id
    pub artifact: String,
    /// Its type
    pub artifact_type: ArtifactType,
    /// Its title
    pub title: String,
    /// Chain completeness
    pub status: ChainStatus,
    /// Number of non-empty levels
    pub chain_length: usize,
    /// Connected artifacts, the traced one included
    pub total_artifacts_in_chain: usize,
    /// Non-empty levels in chain order
    pub chain: Vec<ChainLink>,
    /// Human-readable breaks
    pub breaks: Vec<String>,
    /// Levels present
    pub types_covered: Vec<String>,
    /// Levels absent
    pub types_missing: Vec<String>,
}

/// A connected artifact and the label that reached it
struct Connected<'g> {
    artifact: &'g Artifact,
    via: String,
}

/// Breadth-first collection of every defined artifact reachable from `start`
///
/// Ids already in `visited` are skipped; undefined ids are marked but not
/// walked through.
fn collect_connected<'g>(
    start: &'g str,
    direction: Direction,
    by_id: &HashMap<&'g str, &'g Artifact>,
    index: &HashMap<&'g str, Vec<&'g Relationship>>,
    visited: &mut HashSet<&'g str>,
) -> Vec<Connected<'g>> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for rel in index.get(node).into_iter().flatten().copied() {
            let neighbour = direction.neighbour(rel);
            if !visited.insert(neighbour) {
                continue;
            }
            if let Some(&artifact) = by_id.get(neighbour) {
                found.push(Connected {
                    artifact,
                    via: rel.kind.to_string(),
                });
                queue.push_back(neighbour);
            }
        }
    }
    found
}

/// Evidence entries for one of the COMMIT, CODE or TEST levels
fn evidence_entries(level: &str, connected: &[Connected<'_>]) -> Vec<ChainEntry> {
    let artifacts = connected.iter().map(|c| c.artifact);
    let entries: Vec<ChainEntry> = match level {
        "COMMIT" => artifacts
            .flat_map(|a| &a.commit_refs)
            .map(|c| ChainEntry {
                id: c.sha.clone(),
                title: c.message.clone(),
                file: c.task_id.clone().unwrap_or_else(|| "no task".to_string()),
                relationship: None,
            })
            .collect(),
        "CODE" => artifacts
            .flat_map(|a| &a.code_refs)
            .map(|c| ChainEntry {
                id: format!("{}@{}:{}", c.symbol, c.file, c.line),
                title: format!("{} ({})", c.symbol, c.symbol_type),
                file: c.file.clone(),
                relationship: None,
            })
            .collect(),
        "TEST" => artifacts
            .flat_map(|a| &a.test_refs)
            .map(|t| ChainEntry {
                id: format!("{}@{}:{}", t.test_name, t.file, t.line),
                title: t.test_name.clone(),
                file: t.file.clone(),
                relationship: None,
            })
            .collect(),
        _ => Vec::new(),
    };
    entries.into_iter().take(EVIDENCE_LIMIT).collect()
}

/// Trace the chain through `id`
pub fn trace(graph: &TraceGraph, id: &str) -> Result<TraceReport, AnalysisError> {
    let by_id = artifact_index(graph);
    let root = *by_id.get(id).ok_or_else(|| AnalysisError::UnknownArtifact(id.to_string()))?;
    let upstream_index = relationship_index(graph, Direction::Upstream);
    let downstream_index = relationship_index(graph, Direction::Downstream);

    let root_id = root.id.as_str();
    let mut visited = HashSet::from([root_id]);
    let upstream =
        collect_connected(root_id, Direction::Upstream, &by_id, &upstream_index, &mut visited);
    // Downstream may revisit nothing found upstream
    let mut seen = visited.clone();
    let downstream =
        collect_connected(root_id, Direction::Downstream, &by_id, &downstream_index, &mut seen);

    let mut connected = vec![Connected {
        artifact: root,
        via: SELF_LINK.to_string(),
    }];
    connected.extend(upstream);
    connected.extend(downstream);

    let mut chain = Vec::new();
    for level in CHAIN {
        let artifacts = match level {
            "COMMIT" | "CODE" | "TEST" => evidence_entries(level, &connected),
            _ => connected
                .iter()
                .filter(|c| c.artifact.kind.code() == level)
                .map(|c| ChainEntry {
                    id: c.artifact.id.clone(),
                    title: c.artifact.title.clone(),
                    file: c.artifact.file.clone(),
                    relationship: Some(c.via.clone()),
                })
                .collect(),
        };
        if !artifacts.is_empty() {
            chain.push(ChainLink {
                level: level.to_string(),
                artifacts,
            });
        }
    }

    let covered: HashSet<&str> = chain.iter().map(|l| l.level.as_str()).collect();
    let mut breaks = Vec::new();
    if let Some(position) = CHAIN.iter().position(|l| *l == root.kind.code()) {
        for level in &CHAIN[..position] {
            if !covered.contains(level) {
                breaks.push(format!("Missing {level} link upstream of {}", root.kind));
            }
        }
        for level in &CHAIN[position + 1..] {
            if KEY_DOWNSTREAM.contains(level) && !covered.contains(level) {
                breaks.push(format!("Missing {level} link downstream of {}", root.kind));
            }
        }
    }

    let (types_covered, types_missing): (Vec<&str>, Vec<&str>) =
        CHAIN.iter().partition(|l| covered.contains(*l));

    Ok(TraceReport {
        artifact: root.id.clone(),
        artifact_type: root.kind,
        title: root.title.clone(),
        status: ChainStatus::from_breaks(breaks.len()),
        chain_length: chain.len(),
        total_artifacts_in_chain: connected.len(),
        chain,
        breaks,
        types_covered: types_covered.into_iter().map(String::from).collect(),
        types_missing: types_missing.into_iter().map(String::from).collect(),
    })
}
