//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::coverage::{CoverageMetric, TraceabilityCoverage};
use crate::gaps::{GapReport, GapTally, RequirementGap};
use crate::graph::TraceGraph;
use crate::impact::ImpactReport;
use crate::models::{CodeStats, CommitStats, TestStats};
use crate::trace::TraceReport;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Summary of a `generate` run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    /// Project display name
    pub project_name: String,
    /// Written graph file
    pub output_file: String,
    /// Defined artifacts
    pub total_artifacts: usize,
    /// Artifact count per type code
    pub by_type: BTreeMap<String, usize>,
    /// Deduplicated edges
    pub total_relationships: usize,
    /// Requirement coverage
    pub traceability_coverage: TraceabilityCoverage,
    /// Reported orphans
    pub orphans: usize,
    /// Reported broken references
    pub broken_references: usize,
    /// Code scan totals
    pub code_stats: CodeStats,
    /// Test scan totals
    pub test_stats: TestStats,
    /// Commit totals
    pub commit_stats: CommitStats,
}

impl GenerateResult {
    /// Summarize a graph written to `output_file`
    #[must_use]
    pub fn from_graph(graph: &TraceGraph, output_file: &str) -> Self {
        let stats = &graph.statistics;
        Self {
            project_name: graph.project_name.clone(),
            output_file: output_file.to_string(),
            total_artifacts: stats.total_artifacts,
            by_type: stats.by_type.clone(),
            total_relationships: stats.total_relationships,
            traceability_coverage: stats.traceability_coverage,
            orphans: stats.orphans.len(),
            broken_references: stats.broken_references.len(),
            code_stats: stats.code_stats,
            test_stats: stats.test_stats,
            commit_stats: stats.commit_stats,
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Traceability graph for {}\n", self.project_name);
        println!("Artifacts: {}", self.total_artifacts);
        for (code, count) in &self.by_type {
            println!("  {code:<5} {count}");
        }
        println!("Relationships: {}", self.total_relationships);

        let c = &self.traceability_coverage;
        println!("\nRequirement coverage:");
        print_metric("use cases", c.reqs_with_ucs);
        print_metric("scenarios", c.reqs_with_bdd);
        print_metric("tasks", c.reqs_with_tasks);
        print_metric("code", c.reqs_with_code);
        print_metric("tests", c.reqs_with_tests);
        print_metric("commits", c.reqs_with_commits);

        println!(
            "\nCommits: {} total, {} with refs, {} with tasks, {} tasks covered",
            self.commit_stats.total_commits,
            self.commit_stats.commits_with_refs,
            self.commit_stats.commits_with_tasks,
            self.commit_stats.unique_tasks_covered
        );
        println!(
            "Code files: {}, symbols: {}, with refs: {}",
            self.code_stats.total_files,
            self.code_stats.total_symbols,
            self.code_stats.symbols_with_refs
        );
        println!(
            "Test files: {}, tests: {}, with refs: {}",
            self.test_stats.total_test_files,
            self.test_stats.total_tests,
            self.test_stats.tests_with_refs
        );

        if self.orphans > 0 {
            println!("Orphans: {}", self.orphans);
        }
        if self.broken_references > 0 {
            println!("Broken references: {}", self.broken_references);
        }
        println!("\nWrote {}", self.output_file);
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

fn print_metric(label: &str, metric: CoverageMetric) {
    println!("  {label:<10} {}/{} ({}%)", metric.count, metric.total, metric.percentage);
}

impl ImpactReport {
    /// Render the report based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Impact of changing {} ({}): {}", self.artifact, self.artifact_type, self.title);
        println!("Direction: {}, max depth: {}\n", self.direction, self.max_depth);

        if self.by_depth.is_empty() {
            println!("Nothing affected.");
        }
        for level in &self.by_depth {
            println!("[{}] depth {} ({})", level.label, level.depth, level.artifacts.len());
            for a in &level.artifacts {
                println!("  {} {} via {}", a.id, a.title, a.via_relationship);
            }
            println!();
        }

        println!("Risk: {} ({} affected)", self.risk, self.total_affected);
        if !self.affected_stages.is_empty() {
            println!("Stages: {}", self.affected_stages.join(", "));
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl TraceReport {
    /// Render the report based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Trace of {} ({}): {}", self.artifact, self.artifact_type, self.title);
        println!(
            "Status: {} ({} levels, {} artifacts)\n",
            self.status, self.chain_length, self.total_artifacts_in_chain
        );

        for link in &self.chain {
            println!("[{}] ({})", link.level, link.artifacts.len());
            for entry in &link.artifacts {
                let via = entry.relationship.as_ref().map(|r| format!(" via {r}")).unwrap_or_default();
                println!("  {} {}{via}", entry.id, entry.title);
            }
        }

        if !self.breaks.is_empty() {
            println!("\nBreaks:");
            for b in &self.breaks {
                println!("  {b}");
            }
        }
        if !self.types_missing.is_empty() {
            println!("\nMissing levels: {}", self.types_missing.join(", "));
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

impl GapReport {
    /// Render the report based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Coverage gaps over {} requirements", self.total_reqs);
        if let Some(domain) = &self.filters.domain {
            println!("Domain filter: {domain}");
        }
        if let Some(layer) = &self.filters.layer {
            println!("Layer filter: {layer}");
        }

        println!("\nBy domain:");
        for d in &self.by_domain {
            print_tally(&d.domain, d.tally);
        }
        println!("\nBy layer:");
        for l in &self.by_layer {
            print_tally(&l.layer, l.tally);
        }

        print_gaps("Uncovered", &self.uncovered);
        print_gaps("Closest to complete", &self.top_gaps);
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

fn print_tally(name: &str, tally: GapTally) {
    println!(
        "  {name:<24} {}/{} covered ({}%), {} partial, {} uncovered",
        tally.covered, tally.total, tally.coverage_percent, tally.partial, tally.uncovered
    );
}

fn print_gaps(heading: &str, gaps: &[RequirementGap]) {
    if gaps.is_empty() {
        return;
    }
    println!("\n{heading}:");
    for gap in gaps {
        let missing: Vec<String> = gap.missing_links.iter().map(ToString::to_string).collect();
        println!("  {} {} (missing {})", gap.id, gap.title, missing.join(", "));
    }
}
