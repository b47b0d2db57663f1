//! Graph assembler
//!
//! Runs the four scanners concurrently, resolves references into edges,
//! attaches and propagates evidence, classifies requirements and merges it
//! all with the pass-through snapshots into one [`TraceGraph`].
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use tracegraph::config::Config;
//! use tracegraph::graph;
//!
//! let root = Path::new(".");
//! let graph = graph::build(root, &Config::load(root), "demo", &root.join("dashboard")).unwrap();
//! println!("{} artifacts", graph.statistics.total_artifacts);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classification::{self, ClassificationStats};
use crate::config::Config;
use crate::coverage::{self, Adjacency, BrokenReference, EvidenceIndex, TraceabilityCoverage};
use crate::error::TraceError;
use crate::models::{Artifact, CodeStats, CommitRef, CommitStats, Relationship, Stage, TestStats};
use crate::paths;
use crate::resolver;
use crate::scanner::code_refs::{self, CodeScan};
use crate::scanner::commits;
use crate::scanner::docs::{self, DocScan};
use crate::scanner::test_refs::{self, TestScan};
use crate::snapshot::{AdoptionSnapshot, PipelineSnapshot};

/// Schema tag of the output graph
pub const SCHEMA: &str = "traceability-graph-v3";

/// The assembled traceability graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceGraph {
    /// Schema tag
    #[serde(rename = "$schema")]
    pub schema: String,
    /// Generation time, RFC 3339
    pub generated_at: String,
    /// Display name of the project
    pub project_name: String,
    /// Pipeline stage summary
    pub pipeline: Pipeline,
    /// Defined artifacts in registration order
    pub artifacts: Vec<Artifact>,
    /// Document edges in discovery order, then commit edges
    pub relationships: Vec<Relationship>,
    /// Aggregate statistics
    pub statistics: Statistics,
    /// Adoption snapshot, passed through
    pub adoption: Value,
}

/// Pipeline summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    /// Current stage from the snapshot, or `unknown`
    pub current_stage: String,
    /// Every stage in fixed order
    pub stages: Vec<PipelineStage>,
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    /// Stage name
    pub name: String,
    /// Status from the snapshot, or `unknown`
    pub status: String,
    /// Last run from the snapshot
    pub last_run: Option<Value>,
    /// Artifacts whose type belongs to this stage
    pub artifact_count: usize,
}

/// Aggregate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Defined artifacts
    pub total_artifacts: usize,
    /// Artifact count per type code, sorted by code
    pub by_type: BTreeMap<String, usize>,
    /// Deduplicated edges
    pub total_relationships: usize,
    /// Requirement coverage per downstream kind
    pub traceability_coverage: TraceabilityCoverage,
    /// Defined ids without edges, sorted and capped
    pub orphans: Vec<String>,
    /// Undefined reference targets, capped
    pub broken_references: Vec<BrokenReference>,
    /// Code scan totals
    pub code_stats: CodeStats,
    /// Test scan totals
    pub test_stats: TestStats,
    /// Commit totals
    pub commit_stats: CommitStats,
    /// Requirement classification tallies
    pub classification_stats: ClassificationStats,
    /// Adoption statistics, passed through
    pub adoption_stats: Option<Value>,
}

/// Everything the scanners produced
#[derive(Debug, Clone, Default)]
pub struct ScanResults {
    /// Documentation scan
    pub docs: DocScan,
    /// Commits with trailers
    pub commits: Vec<CommitRef>,
    /// Code tags
    pub code: CodeScan,
    /// Test references
    pub tests: TestScan,
}

/// Check that the project root exists and is a directory
pub fn validate_root(project_root: &Path) -> Result<PathBuf, TraceError> {
    if !project_root.exists() {
        return Err(TraceError::ProjectRootNotFound(project_root.to_path_buf()));
    }
    if !project_root.is_dir() {
        return Err(TraceError::NotADirectory(project_root.to_path_buf()));
    }
    Ok(project_root.to_path_buf())
}

/// Run all four scanners concurrently
#[must_use]
pub fn scan_all(project_root: &Path, config: &Config) -> ScanResults {
    let skip = &config.docs.skip_dirs;
    let ((docs, commits), (code, tests)) = rayon::join(
        || {
            rayon::join(
                || docs::scan_documents(project_root, &config.docs),
                || commits::scan_commits(project_root, &config.git),
            )
        },
        || {
            rayon::join(
                || code_refs::scan_code(project_root, &config.code, skip),
                || test_refs::scan_tests(project_root, &config.tests, skip),
            )
        },
    );
    ScanResults {
        docs,
        commits,
        code,
        tests,
    }
}

/// Assemble a graph from scan results and snapshots
///
/// Pure apart from logging; `generated_at` is the only value that differs
/// between two assemblies of the same input.
#[must_use]
pub fn assemble(
    scans: ScanResults,
    pipeline: &PipelineSnapshot,
    adoption: AdoptionSnapshot,
    project_name: &str,
    generated_at: String,
    limit: usize,
) -> TraceGraph {
    let ScanResults {
        docs,
        commits,
        code,
        tests,
    } = scans;
    let DocScan {
        mut registry,
        references,
        ..
    } = docs;

    let mut edges = resolver::resolve(&references);
    resolver::add_commit_edges(&mut edges, &commits, &registry);
    let adjacency = Adjacency::from_edges(edges.as_slice());

    let evidence = EvidenceIndex::build(&code.refs, &tests.refs, &commits);
    evidence.attach(&mut registry);

    let traceability_coverage = coverage::traceability_coverage(&registry, &adjacency, &evidence);
    let classification_stats = classification::classify_requirements(&mut registry, &adjacency);
    let orphans = coverage::orphans(&registry, &adjacency, limit);
    let broken_references = coverage::broken_references(&registry, &references, limit);

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_stage: HashMap<Stage, usize> = HashMap::new();
    for artifact in registry.iter() {
        *by_type.entry(artifact.kind.code().to_string()).or_default() += 1;
        *by_stage.entry(artifact.stage).or_default() += 1;
    }

    let stages = Stage::ORDER
        .iter()
        .map(|stage| {
            let status = pipeline.stage(stage.as_str());
            PipelineStage {
                name: stage.as_str().to_string(),
                status: status.status,
                last_run: status.last_run,
                artifact_count: by_stage.get(stage).copied().unwrap_or_default(),
            }
        })
        .collect();

    let statistics = Statistics {
        total_artifacts: registry.len(),
        by_type,
        total_relationships: edges.len(),
        traceability_coverage,
        orphans,
        broken_references,
        code_stats: code.stats,
        test_stats: tests.stats,
        commit_stats: CommitStats::from_commits(&commits),
        classification_stats,
        adoption_stats: adoption.adoption_stats,
    };

    TraceGraph {
        schema: SCHEMA.to_string(),
        generated_at,
        project_name: project_name.to_string(),
        pipeline: Pipeline {
            current_stage: pipeline.current_stage().to_string(),
            stages,
        },
        artifacts: registry.into_vec(),
        relationships: edges.into_vec(),
        statistics,
        adoption: adoption.adoption,
    }
}

/// Scan a project and assemble its graph
///
/// Fails only when the project root itself is inaccessible.
pub fn build(
    project_root: &Path,
    config: &Config,
    project_name: &str,
    output_dir: &Path,
) -> Result<TraceGraph, TraceError> {
    let root = validate_root(project_root)?;
    let scans = scan_all(&root, config);
    let pipeline = PipelineSnapshot::load(&root);
    let adoption = AdoptionSnapshot::load(output_dir);
    Ok(assemble(
        scans,
        &pipeline,
        adoption,
        project_name,
        Utc::now().to_rfc3339(),
        config.report.limit,
    ))
}

/// Write the graph as pretty JSON into the output directory
pub fn write(graph: &TraceGraph, output_dir: &Path) -> Result<PathBuf, TraceError> {
    fs::create_dir_all(output_dir)?;
    let path = paths::graph_file(output_dir);
    fs::write(&path, serde_json::to_string_pretty(graph)?)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Read a previously written graph
pub fn read(path: &Path) -> Result<TraceGraph, TraceError> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
