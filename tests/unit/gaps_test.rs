//! Tests for requirement coverage gaps

use tracegraph::gaps::{GapFilter, MissingLink, analyze};
use tracegraph::graph::{self, ScanResults, TraceGraph};
use tracegraph::scanner::code_refs::CodeScan;
use tracegraph::scanner::docs;
use tracegraph::scanner::test_refs::TestScan;
use tracegraph::snapshot::{AdoptionSnapshot, PipelineSnapshot};

use crate::common::{code_ref, lines, test_ref};

/// Four requirements, from fully linked (REQ-SEC-001) to bare (REQ-002)
fn gap_graph() -> TraceGraph {
    let files = [
        (
            "spec/bdd.md",
            "## BDD-login: Login scenario\nChecks REQ-SEC-001\n## BDD-export: Export scenario\nChecks REQ-001\n",
        ),
        (
            "spec/req.md",
            "## REQ-SEC-001: Token rotation\nDelivered by TASK-F3-012\n## REQ-001: Export\n## REQ-002: Import\n## REQ-003: Audit\n",
        ),
        (
            "spec/uc.md",
            "## UC-001: Login\nFor REQ-SEC-001\n## UC-002: Export flow\nFor REQ-001\n## UC-003: Audit trail\nFor REQ-003\n",
        ),
        ("task/t.md", "## TASK-F3-012: Rotate tokens\n"),
    ];
    let scan = docs::merge(files.iter().map(|&(path, text)| docs::scan_file(path, path, &lines(text))));
    graph::assemble(
        ScanResults {
            docs: scan,
            code: CodeScan {
                refs: vec![code_ref(&["REQ-SEC-001", "REQ-001"])],
                ..CodeScan::default()
            },
            tests: TestScan {
                refs: vec![test_ref(&["REQ-SEC-001"])],
                ..TestScan::default()
            },
            ..ScanResults::default()
        },
        &PipelineSnapshot::default(),
        AdoptionSnapshot::default(),
        "demo",
        String::new(),
        50,
    )
}

fn filter(domain: Option<&str>, layer: Option<&str>) -> GapFilter {
    GapFilter {
        domain: domain.map(String::from),
        layer: layer.map(String::from),
    }
}

#[test]
fn test_requirements_bucketed_by_missing_links() {
    let report = analyze(&gap_graph(), &GapFilter::default());
    assert_eq!(report.total_reqs, 4);

    let uncovered: Vec<&str> = report.uncovered.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(uncovered, vec!["REQ-002"]);
    assert_eq!(report.uncovered[0].missing_links, MissingLink::ALL.to_vec());

    // REQ-003 misses three links: partial, but too far from complete to list
    assert_eq!(report.top_gaps.len(), 1);
    assert_eq!(report.top_gaps[0].id, "REQ-001");
    assert_eq!(report.top_gaps[0].title, "Export");
    assert_eq!(report.top_gaps[0].missing_links, vec![MissingLink::Tests]);
}

#[test]
fn test_tallies_by_domain_and_layer() {
    let report = analyze(&gap_graph(), &GapFilter::default());

    let domains: Vec<(&str, usize, usize, usize, usize, usize)> = report
        .by_domain
        .iter()
        .map(|d| {
            let t = d.tally;
            (d.domain.as_str(), t.total, t.covered, t.partial, t.uncovered, t.coverage_percent)
        })
        .collect();
    assert_eq!(domains, vec![("Other", 3, 0, 2, 1, 0), ("Security & Auth", 1, 1, 0, 0, 100)]);

    let layers: Vec<(&str, usize)> =
        report.by_layer.iter().map(|l| (l.layer.as_str(), l.tally.total)).collect();
    assert_eq!(layers, vec![("Backend", 1), ("Unknown", 3)]);
}

#[test]
fn test_filters_are_case_insensitive_substrings() {
    let graph = gap_graph();

    let security = analyze(&graph, &filter(Some("security"), None));
    assert_eq!(security.total_reqs, 1);
    assert!(security.uncovered.is_empty());
    assert_eq!(security.by_domain[0].tally.coverage_percent, 100);

    let unknown = analyze(&graph, &filter(None, Some("UNK")));
    assert_eq!(unknown.total_reqs, 3);

    let both = analyze(&graph, &filter(Some("other"), Some("backend")));
    assert_eq!(both.total_reqs, 0);
    assert!(both.by_domain.is_empty());
    assert!(both.by_layer.is_empty());
}

#[test]
fn test_overall_coverage_ignores_filters() {
    let graph = gap_graph();
    let report = analyze(&graph, &filter(Some("security"), None));
    assert_eq!(report.overall_coverage, graph.statistics.traceability_coverage);
    assert_eq!(report.overall_coverage.reqs_with_ucs.total, 4);
}

#[test]
fn test_uncovered_requirements_are_capped() {
    let requirements: String = (1..=25).map(|n| format!("## REQ-{n:03}: Item {n}\n")).collect();
    let scan = docs::merge([docs::scan_file("spec/req.md", "req.md", &lines(&requirements))]);
    let graph = graph::assemble(
        ScanResults {
            docs: scan,
            ..ScanResults::default()
        },
        &PipelineSnapshot::default(),
        AdoptionSnapshot::default(),
        "demo",
        String::new(),
        50,
    );
    let report = analyze(&graph, &GapFilter::default());
    assert_eq!(report.total_reqs, 25);
    assert_eq!(report.uncovered.len(), tracegraph::gaps::UNCOVERED_LIMIT);
    assert_eq!(report.uncovered[0].id, "REQ-001");
    assert_eq!(report.by_domain[0].tally.uncovered, 25);
}

#[test]
fn test_report_json_shape() {
    let report = analyze(&gap_graph(), &filter(Some("security"), None));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["filters"]["domain"], "security");
    assert!(json["filters"]["layer"].is_null());
    assert_eq!(json["totalReqs"], 1);
    assert_eq!(json["byDomain"][0]["domain"], "Security & Auth");
    assert_eq!(json["byDomain"][0]["coveragePercent"], 100);
    assert_eq!(json["byLayer"][0]["layer"], "Backend");
    assert!(json["overallCoverage"]["reqsWithUCs"].is_object());

    let full = serde_json::to_value(analyze(&gap_graph(), &GapFilter::default())).unwrap();
    assert_eq!(full["topGaps"][0]["missingLinks"], serde_json::json!(["Tests"]));
    assert_eq!(full["uncovered"][0]["missingLinks"], serde_json::json!(["UC", "BDD", "Code", "Tests"]));
}
