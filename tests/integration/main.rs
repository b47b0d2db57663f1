//! Integration tests for the tracegraph CLI
//!
//! These tests build small projects on disk (documentation, sources, tests
//! and a git history) and run the binary against them.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a tracegraph command
fn tracegraph() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("tracegraph"))
}

/// Helper to initialize a git repo with basic config
fn init_git_repo(path: &Path) {
    Command::new("git")
        .args(["init"])
        .current_dir(path)
        .output()
        .expect("Failed to init git repo");

    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(path)
        .output()
        .expect("Failed to configure git email");

    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(path)
        .output()
        .expect("Failed to configure git name");
}

/// Helper to stage files in git
fn git_add(path: &Path, file: &str) {
    Command::new("git")
        .args(["add", file])
        .current_dir(path)
        .output()
        .expect("Failed to stage file");
}

/// Helper to create a git commit
fn git_commit(path: &Path, message: &str) {
    Command::new("git")
        .args(["commit", "-m", message])
        .current_dir(path)
        .output()
        .expect("Failed to create commit");
}

/// Helper to write a file, creating parent directories
fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project with requirements, a use case, a task, code and tests
fn sample_project(root: &Path) {
    write(
        root,
        "spec/requirements.md",
        "# Requirements\n\n### REQ-SEC-001: Token rotation\nMust Have\n\n### REQ-EXT-002: Parse CVs\n",
    );
    write(root, "spec/UC-002-login.md", "# UC-002: Login\n\nImplements REQ-SEC-001\n");
    write(root, "task/tasks.md", "## TASK-F3-012: Rotate tokens\nDelivers UC-002\n");
    write(root, "src/auth.ts", "// Refs: REQ-SEC-001\nexport function rotateToken() {}\n");
    write(
        root,
        "tests/auth.test.ts",
        "describe('auth', () => {\n  it('rotates REQ-EXT-002 keys', () => {});\n});\n",
    );
}

fn read_graph(root: &Path) -> serde_json::Value {
    let content = fs::read_to_string(root.join("dashboard/traceability-graph.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn artifact<'a>(graph: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    graph["artifacts"].as_array().unwrap().iter().find(|a| a["id"] == id).unwrap()
}

// =============================================================================
// GENERATE
// =============================================================================

#[test]
fn test_generate_writes_graph() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_project(root);

    tracegraph()
        .args(["generate", "--project"])
        .arg(root)
        .args(["--name", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Traceability graph for demo"))
        .stdout(predicate::str::contains("traceability-graph.json"));

    let graph = read_graph(root);
    assert_eq!(graph["$schema"], "traceability-graph-v3");
    assert_eq!(graph["projectName"], "demo");
    assert_eq!(graph["statistics"]["totalArtifacts"], 4);

    let req = artifact(&graph, "REQ-SEC-001");
    assert_eq!(req["category"], "SEC");
    assert_eq!(req["title"], "Token rotation");
    assert_eq!(req["priority"], "Must Have");
    assert_eq!(req["classification"]["businessDomain"], "Security & Auth");
    assert_eq!(req["codeRefs"][0]["symbol"], "rotateToken");

    let coverage = &graph["statistics"]["traceabilityCoverage"];
    assert_eq!(coverage["reqsWithUCs"]["count"], 1);
    assert_eq!(coverage["reqsWithCode"]["count"], 1);
    assert_eq!(coverage["reqsWithTests"]["count"], 1);
    assert_eq!(coverage["reqsWithCommits"]["count"], 0);
}

#[test]
fn test_generate_links_commit_trailers() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    init_git_repo(root);
    sample_project(root);
    git_add(root, ".");
    git_commit(root, "feat: rotate tokens\n\nTask: TASK-F3-012\nRefs: REQ-SEC-001, UC-002");
    write(root, "README.md", "# Demo\n");
    git_add(root, "README.md");
    git_commit(root, "docs: readme");

    tracegraph()
        .args(["--json", "generate", "--project"])
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalCommits\": 1"));

    let graph = read_graph(root);
    for id in ["REQ-SEC-001", "UC-002", "TASK-F3-012"] {
        assert_eq!(artifact(&graph, id)["commitRefs"].as_array().unwrap().len(), 1, "{id}");
    }
    let commit_edges: Vec<&serde_json::Value> = graph["relationships"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["type"] == "implemented-by-commit")
        .collect();
    assert_eq!(commit_edges.len(), 2);
    assert_eq!(commit_edges[0]["sourceFile"], "git-log");

    let coverage = &graph["statistics"]["traceabilityCoverage"]["reqsWithCommits"];
    assert_eq!(coverage["count"], 1);
    assert_eq!(coverage["percentage"], 50.0);
    assert_eq!(graph["statistics"]["commitStats"]["uniqueTasksCovered"], 1);
}

#[test]
fn test_generate_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_project(root);

    let run = || {
        tracegraph().args(["generate", "--project"]).arg(root).assert().success();
        let mut graph = read_graph(root);
        graph["generatedAt"] = serde_json::Value::Null;
        graph
    };
    assert_eq!(run(), run());
}

#[test]
fn test_generate_custom_output_and_snapshots() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_project(root);
    write(root, "pipeline-state.json", r#"{"currentStage": "test-planner"}"#);
    write(root, "out/adoption-data.json", r#"{"adoption": {"present": true}}"#);

    tracegraph()
        .args(["generate", "--project"])
        .arg(root)
        .arg("--output")
        .arg(root.join("out"))
        .assert()
        .success();

    let content = fs::read_to_string(root.join("out/traceability-graph.json")).unwrap();
    let graph: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(graph["pipeline"]["currentStage"], "test-planner");
    assert_eq!(graph["adoption"]["present"], true);
}

#[test]
fn test_generate_empty_project() {
    let temp = TempDir::new().unwrap();
    tracegraph()
        .args(["generate", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Artifacts: 0"));
}

#[test]
fn test_generate_missing_project_fails() {
    let temp = TempDir::new().unwrap();
    tracegraph()
        .args(["generate", "--project"])
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("project root does not exist"));
}

// =============================================================================
// IMPACT
// =============================================================================

#[test]
fn test_impact_downstream() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_project(root);

    tracegraph()
        .args(["impact", "REQ-SEC-001", "--project"])
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("WILL_BREAK"))
        .stdout(predicate::str::contains("UC-002"))
        .stdout(predicate::str::contains("TASK-F3-012"));
}

#[test]
fn test_impact_json_upstream() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_project(root);

    let output = tracegraph()
        .args(["--json", "impact", "TASK-F3-012", "--direction", "up", "--project"])
        .arg(root)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["direction"], "upstream");
    assert_eq!(report["risk"], "LOW");
    assert_eq!(report["totalAffected"], 2);
    assert_eq!(report["byDepth"][0]["artifacts"][0]["id"], "UC-002");
    assert_eq!(report["byDepth"][1]["artifacts"][0]["id"], "REQ-SEC-001");
}

#[test]
fn test_impact_unknown_artifact_fails() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    tracegraph()
        .args(["impact", "REQ-404", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("artifact not found: REQ-404"));
}

#[test]
fn test_impact_invalid_direction_fails() {
    let temp = TempDir::new().unwrap();
    tracegraph()
        .args(["impact", "REQ-001", "--direction", "sideways", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid direction"));
}

// =============================================================================
// TRACE
// =============================================================================

#[test]
fn test_trace_reports_chain_breaks() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());

    tracegraph()
        .args(["trace", "REQ-SEC-001", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: PARTIAL"))
        .stdout(predicate::str::contains("TASK-F3-012"))
        .stdout(predicate::str::contains("rotateToken@src/auth.ts:1"))
        .stdout(predicate::str::contains("Missing BDD link downstream of REQ"))
        .stdout(predicate::str::contains("Missing TEST link downstream of REQ"));
}

#[test]
fn test_trace_json() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());

    let output = tracegraph()
        .args(["--json", "trace", "UC-002", "--project"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["artifact"], "UC-002");
    assert_eq!(report["totalArtifactsInChain"], 3);
    let levels: Vec<&str> = report["chain"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["level"].as_str().unwrap())
        .collect();
    assert_eq!(levels, vec!["REQ", "UC", "TASK", "CODE"]);
}

#[test]
fn test_trace_unknown_artifact_fails() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    tracegraph()
        .args(["trace", "UC-404", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("artifact not found: UC-404"));
}

// =============================================================================
// COVERAGE
// =============================================================================

#[test]
fn test_coverage_lists_gaps() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());

    tracegraph()
        .args(["coverage", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Coverage gaps over 2 requirements"))
        .stdout(predicate::str::contains("Security & Auth"))
        .stdout(predicate::str::contains("REQ-SEC-001 Token rotation (missing BDD, Tests)"));
}

#[test]
fn test_coverage_json_with_domain_filter() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());

    let output = tracegraph()
        .args(["--json", "coverage", "--domain", "SECURITY", "--project"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["filters"]["domain"], "SECURITY");
    assert_eq!(report["totalReqs"], 1);
    assert_eq!(report["topGaps"][0]["id"], "REQ-SEC-001");
    assert_eq!(report["topGaps"][0]["missingLinks"], serde_json::json!(["BDD", "Tests"]));
    assert_eq!(report["overallCoverage"]["reqsWithUCs"]["total"], 2);
}

// =============================================================================
// VERSION
// =============================================================================

#[test]
fn test_version() {
    tracegraph()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tracegraph v"));
}

#[test]
fn test_version_json() {
    tracegraph()
        .args(["--json", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}
