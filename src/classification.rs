//! Requirement classification
//!
//! Each requirement gets three labels, all derived from id shape and graph
//! position alone:
//! - business domain, from its category token (`REQ-SEC-001` -> `SEC`)
//! - technical layer, from the phases of the tasks reachable from it
//! - functional category, from its category token

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::coverage::Adjacency;
use crate::grammar;
use crate::models::{Artifact, ArtifactType, Classification};
use crate::registry::ArtifactRegistry;

/// Domain for requirements without a category or with an unmapped one
pub const DEFAULT_DOMAIN: &str = "Other";

/// Business domain per category token
const DOMAINS: &[(&str, &str)] = &[
    ("EXT", "Extraction & Processing"),
    ("CVA", "Extraction & Processing"),
    ("VAL", "Extraction & Processing"),
    ("PRO", "Extraction & Processing"),
    ("DOC", "Extraction & Processing"),
    ("PAR", "Extraction & Processing"),
    ("OCR", "Extraction & Processing"),
    ("PRM", "Extraction & Processing"),
    ("MAT", "Matching & Selection"),
    ("OFF", "Matching & Selection"),
    ("SEL", "Matching & Selection"),
    ("SRC", "Matching & Selection"),
    ("SEC", "Security & Auth"),
    ("AUT", "Security & Auth"),
    ("PRV", "Security & Auth"),
    ("LOG", "Security & Auth"),
    ("CRD", "Security & Auth"),
    ("TOK", "Security & Auth"),
    ("SSO", "Security & Auth"),
    ("GDP", "GDPR & Privacy"),
    ("GDPR", "GDPR & Privacy"),
    ("DPR", "GDPR & Privacy"),
    ("RET", "GDPR & Privacy"),
    ("UI", "Frontend & UI"),
    ("UX", "Frontend & UI"),
    ("DASH", "Frontend & UI"),
    ("NAV", "Frontend & UI"),
    ("FORM", "Frontend & UI"),
    ("MOD", "Frontend & UI"),
    ("VIS", "Frontend & UI"),
    ("I18N", "Frontend & UI"),
    ("ACC", "Frontend & UI"),
    ("CAN", "Candidate Portal"),
    ("VPR", "Candidate Portal"),
    ("DSH", "Dashboards & Reporting"),
    ("DB", "Data & Storage"),
    ("IDX", "Data & Storage"),
    ("CAC", "Data & Storage"),
    ("MIG", "Data & Storage"),
    ("STO", "Data & Storage"),
    ("BAK", "Data & Storage"),
    ("ARC", "Data & Storage"),
    ("CACHE", "Data & Storage"),
    ("BLK", "Bulk Operations"),
    ("BAT", "Bulk Operations"),
    ("INT", "Integration & APIs"),
    ("WBH", "Integration & APIs"),
    ("NOT", "Integration & APIs"),
    ("MSG", "Integration & APIs"),
    ("EVT", "Integration & APIs"),
    ("SYN", "Integration & APIs"),
    ("NTF", "Integration & APIs"),
    ("INC", "Integration & APIs"),
    ("CFG", "Infrastructure & DevOps"),
    ("ENV", "Infrastructure & DevOps"),
    ("DEP", "Infrastructure & DevOps"),
    ("MON", "Infrastructure & DevOps"),
    ("INF", "Infrastructure & DevOps"),
    ("OPS", "Infrastructure & DevOps"),
    ("CI", "Infrastructure & DevOps"),
    ("SYS", "Infrastructure & DevOps"),
    ("TECH", "Infrastructure & DevOps"),
    ("AVAIL", "Infrastructure & DevOps"),
    ("MNT", "Infrastructure & DevOps"),
    ("REC", "Infrastructure & DevOps"),
    ("PERF", "Performance & Scalability"),
    ("SCAL", "Performance & Scalability"),
    ("RATE", "Performance & Scalability"),
    ("OBS", "Performance & Scalability"),
    ("RPT", "Analytics & Reporting"),
    ("ANL", "Analytics & Reporting"),
    ("MET", "Analytics & Reporting"),
    ("KPI", "Analytics & Reporting"),
    ("EXP", "Analytics & Reporting"),
    ("AGG", "Analytics & Reporting"),
    ("USR", "User Management"),
    ("ROL", "User Management"),
    ("PER", "User Management"),
    ("ORG", "User Management"),
    ("TEN", "User Management"),
    ("DER", "Derived Requirements"),
];

const NON_FUNCTIONAL: &[&str] =
    &["PERF", "SEC", "SCAL", "AVAIL", "TECH", "CACHE", "OBS", "RATE", "VAL", "I18N", "ACC"];
const SECURITY: &[&str] = &["SEC", "AUT", "GDP", "GDPR", "DPR"];
const DATA: &[&str] = &["RET", "DPR", "AUT", "MNT"];
const INTEGRATION: &[&str] = &["NTF", "INC", "DEP", "MON", "REC", "DER"];

/// Technical layer a phase belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Phase 0
    Infrastructure,
    /// Phases 1 to 6
    Backend,
    /// Phases 7 and 8
    Frontend,
    /// Any later phase
    IntegrationDeployment,
}

impl Layer {
    /// Layer of a phase number
    #[must_use]
    pub const fn from_phase(phase: u32) -> Self {
        match phase {
            0 => Self::Infrastructure,
            1..=6 => Self::Backend,
            7..=8 => Self::Frontend,
            _ => Self::IntegrationDeployment,
        }
    }

    /// Display label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Backend => "Backend",
            Self::Frontend => "Frontend",
            Self::IntegrationDeployment => "Integration/Deployment",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label when no task is reachable
pub const UNKNOWN_LAYER: &str = "Unknown";

/// Requirement counts per label
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStats {
    /// Per business domain
    pub by_domain: BTreeMap<String, usize>,
    /// Per technical layer
    pub by_layer: BTreeMap<String, usize>,
    /// Per functional category
    pub by_category: BTreeMap<String, usize>,
}

/// Business domain for a category token
#[must_use]
pub fn business_domain(category: Option<&str>) -> &'static str {
    category
        .and_then(|c| DOMAINS.iter().find(|(token, _)| *token == c))
        .map_or(DEFAULT_DOMAIN, |&(_, domain)| domain)
}

/// Functional category for a category token
#[must_use]
pub fn functional_category(category: Option<&str>) -> &'static str {
    let Some(c) = category else {
        return "Functional";
    };
    if NON_FUNCTIONAL.contains(&c) {
        "Non-Functional"
    } else if SECURITY.contains(&c) {
        "Security"
    } else if DATA.contains(&c) {
        "Data"
    } else if INTEGRATION.contains(&c) {
        "Integration"
    } else {
        "Functional"
    }
}

/// Phases of the defined tasks reachable from a requirement
///
/// Tasks are reached through the requirement's own outgoing edges, or through
/// the outgoing edges of the use cases pointing at it.
#[must_use]
pub fn reachable_phases(
    requirement: &str,
    adjacency: &Adjacency,
    registry: &ArtifactRegistry,
) -> BTreeSet<u32> {
    let task_phase = |id: &str| {
        registry
            .get(id)
            .filter(|a| a.kind == ArtifactType::Task)
            .and_then(|a| grammar::task_phase(&a.id))
    };

    let via_use_cases = adjacency
        .incoming(requirement)
        .filter(|src| grammar::classify(src) == Some(ArtifactType::UseCase))
        .flat_map(|uc| adjacency.outgoing(uc));

    adjacency.outgoing(requirement).chain(via_use_cases).filter_map(task_phase).collect()
}

/// Most frequent layer across phases; ties go to the lowest phase's layer
#[must_use]
pub fn technical_layer(phases: &BTreeSet<u32>) -> Option<Layer> {
    let mut counts: Vec<(Layer, usize)> = Vec::new();
    for layer in phases.iter().map(|&p| Layer::from_phase(p)) {
        match counts.iter_mut().find(|(l, _)| *l == layer) {
            Some((_, n)) => *n += 1,
            None => counts.push((layer, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(Layer, usize)>, (layer, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((layer, n)),
        })
        .map(|(layer, _)| layer)
}

/// Classify one requirement
#[must_use]
pub fn classify_requirement(
    requirement: &Artifact,
    adjacency: &Adjacency,
    registry: &ArtifactRegistry,
) -> Classification {
    let category = requirement.category.as_deref();
    let phases = reachable_phases(&requirement.id, adjacency, registry);
    Classification {
        business_domain: business_domain(category).to_string(),
        technical_layer: technical_layer(&phases)
            .map_or_else(|| UNKNOWN_LAYER.to_string(), |l| l.to_string()),
        functional_category: functional_category(category).to_string(),
    }
}

/// Classify every requirement in the registry and tally the labels
///
/// Non-requirement artifacts keep no classification.
pub fn classify_requirements(
    registry: &mut ArtifactRegistry,
    adjacency: &Adjacency,
) -> ClassificationStats {
    let classified: Vec<(String, Classification)> = registry
        .of_type(ArtifactType::Requirement)
        .map(|r| (r.id.clone(), classify_requirement(r, adjacency, registry)))
        .collect();

    let mut stats = ClassificationStats::default();
    for (_, c) in &classified {
        *stats.by_domain.entry(c.business_domain.clone()).or_default() += 1;
        *stats.by_layer.entry(c.technical_layer.clone()).or_default() += 1;
        *stats.by_category.entry(c.functional_category.clone()).or_default() += 1;
    }

    let mut classified = classified.into_iter();
    for artifact in registry.iter_mut() {
        artifact.classification = None;
        if artifact.is_requirement() {
            artifact.classification = classified.next().map(|(_, c)| c);
        }
    }
    stats
}
