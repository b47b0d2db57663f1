//! Coverage gaps per requirement
//!
//! For every requirement, lists which of its expected links are missing: an
//! incoming use case, an incoming behavior scenario, code evidence and test
//! evidence. Requirements are tallied by business domain and technical layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coverage::TraceabilityCoverage;
use crate::graph::TraceGraph;
use crate::impact::{Direction, artifact_index, relationship_index};
use crate::models::{Artifact, ArtifactType};

/// Uncovered requirements listed at most
pub const UNCOVERED_LIMIT: usize = 20;

/// Near-complete requirements listed at most
pub const TOP_GAPS_LIMIT: usize = 15;

/// Most missing links a requirement may have to count as a top gap
const TOP_GAP_MAX_MISSING: usize = 2;

const UNCLASSIFIED_DOMAIN: &str = "Unclassified";
const UNKNOWN_LAYER: &str = "Unknown";

/// A link a requirement is expected to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingLink {
    /// No use case points at it
    #[serde(rename = "UC")]
    UseCase,
    /// No behavior scenario points at it
    #[serde(rename = "BDD")]
    Behavior,
    /// No code reference names it
    Code,
    /// No test reference names it
    Tests,
}

impl MissingLink {
    /// Every expected link
    pub const ALL: [Self; 4] = [Self::UseCase, Self::Behavior, Self::Code, Self::Tests];
}

impl std::fmt::Display for MissingLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UseCase => write!(f, "UC"),
            Self::Behavior => write!(f, "BDD"),
            Self::Code => write!(f, "Code"),
            Self::Tests => write!(f, "Tests"),
        }
    }
}

/// Case-insensitive substring filters on the requirement classification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapFilter {
    /// Business domain filter
    pub domain: Option<String>,
    /// Technical layer filter
    pub layer: Option<String>,
}

impl GapFilter {
    fn matches(&self, requirement: &Artifact) -> bool {
        let contains = |filter: Option<&str>, value: Option<&str>| {
            filter.is_none_or(|f| {
                value.is_some_and(|v| v.to_lowercase().contains(&f.to_lowercase()))
            })
        };
        let classification = requirement.classification.as_ref();
        contains(self.domain.as_deref(), classification.map(|c| c.business_domain.as_str()))
            && contains(self.layer.as_deref(), classification.map(|c| c.technical_layer.as_str()))
    }
}

/// A requirement and the links it lacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementGap {
    /// Requirement id
    pub id: String,
    /// Requirement title
    pub title: String,
    /// Missing links, in [`MissingLink::ALL`] order
    pub missing_links: Vec<MissingLink>,
}

/// Tally of one domain or layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapTally {
    /// Requirements in the group
    pub total: usize,
    /// With every link
    pub covered: usize,
    /// With some links
    pub partial: usize,
    /// With none
    pub uncovered: usize,
    /// `covered / total`, rounded to a whole percent
    pub coverage_percent: usize,
}

impl GapTally {
    fn count(&mut self, missing: usize) {
        self.total += 1;
        match missing {
            0 => self.covered += 1,
            m if m < MissingLink::ALL.len() => self.partial += 1,
            _ => self.uncovered += 1,
        }
        self.coverage_percent = (self.covered * 200 + self.total) / (self.total * 2);
    }
}

/// Tally for one business domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainGaps {
    /// Domain name
    pub domain: String,
    /// Its tally
    #[serde(flatten)]
    pub tally: GapTally,
}

/// Tally for one technical layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGaps {
    /// Layer name
    pub layer: String,
    /// Its tally
    #[serde(flatten)]
    pub tally: GapTally,
}

/// Result of a gap analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    /// Filters applied
    pub filters: GapFilter,
    /// Requirements left after filtering
    pub total_reqs: usize,
    /// Graph-wide coverage, unfiltered
    pub overall_coverage: TraceabilityCoverage,
    /// Tallies by domain, sorted by name
    pub by_domain: Vec<DomainGaps>,
    /// Tallies by layer, sorted by name
    pub by_layer: Vec<LayerGaps>,
    /// Requirements with no expected link, in graph order
    pub uncovered: Vec<RequirementGap>,
    /// Requirements missing at most two links, fewest missing first
    pub top_gaps: Vec<RequirementGap>,
}

/// Find the coverage gaps of every requirement passing `filter`
#[must_use]
pub fn analyze(graph: &TraceGraph, filter: &GapFilter) -> GapReport {
    let by_id = artifact_index(graph);
    let incoming = relationship_index(graph, Direction::Downstream);

    let has_incoming = |id: &str, kind: ArtifactType| {
        incoming
            .get(id)
            .into_iter()
            .flatten()
            .any(|rel| by_id.get(rel.source.as_str()).is_some_and(|a| a.kind == kind))
    };

    let mut by_domain: BTreeMap<String, GapTally> = BTreeMap::new();
    let mut by_layer: BTreeMap<String, GapTally> = BTreeMap::new();
    let mut uncovered = Vec::new();
    let mut top_gaps = Vec::new();
    let mut total_reqs = 0;

    let requirements = graph
        .artifacts
        .iter()
        .filter(|a| a.kind == ArtifactType::Requirement && filter.matches(a));

    for req in requirements {
        total_reqs += 1;
        let missing: Vec<MissingLink> = MissingLink::ALL
            .into_iter()
            .filter(|link| match link {
                MissingLink::UseCase => !has_incoming(&req.id, ArtifactType::UseCase),
                MissingLink::Behavior => !has_incoming(&req.id, ArtifactType::Behavior),
                MissingLink::Code => req.code_refs.is_empty(),
                MissingLink::Tests => req.test_refs.is_empty(),
            })
            .collect();

        let (domain, layer) = req.classification.as_ref().map_or(
            (UNCLASSIFIED_DOMAIN, UNKNOWN_LAYER),
            |c| (c.business_domain.as_str(), c.technical_layer.as_str()),
        );
        by_domain.entry(domain.to_string()).or_default().count(missing.len());
        by_layer.entry(layer.to_string()).or_default().count(missing.len());

        let gap = RequirementGap {
            id: req.id.clone(),
            title: req.title.clone(),
            missing_links: missing,
        };
        let missing = gap.missing_links.len();
        if missing == MissingLink::ALL.len() {
            uncovered.push(gap);
        } else if (1..=TOP_GAP_MAX_MISSING).contains(&missing) {
            top_gaps.push(gap);
        }
    }

    top_gaps.sort_by_key(|g| g.missing_links.len());
    uncovered.truncate(UNCOVERED_LIMIT);
    top_gaps.truncate(TOP_GAPS_LIMIT);

    GapReport {
        filters: filter.clone(),
        total_reqs,
        overall_coverage: graph.statistics.traceability_coverage,
        by_domain: by_domain
            .into_iter()
            .map(|(domain, tally)| DomainGaps { domain, tally })
            .collect(),
        by_layer: by_layer
            .into_iter()
            .map(|(layer, tally)| LayerGaps { layer, tally })
            .collect(),
        uncovered,
        top_gaps,
    }
}
