//! Tests for the identifier grammar and definition tables

use tracegraph::grammar::{
    category, classify, find_ids, heading_patterns, is_excluded, is_valid_id, match_filename,
    match_heading, match_table_row, task_phase, title_from_first_heading,
};
use tracegraph::models::ArtifactType;

use crate::common::lines;

// =============================================================================
// CLASSIFICATION
// =============================================================================

#[test]
fn test_classify_every_prefix() {
    let cases = [
        ("REQ-001", ArtifactType::Requirement),
        ("UC-001", ArtifactType::UseCase),
        ("WF-001", ArtifactType::Workflow),
        ("API-pdf-reader", ArtifactType::Api),
        ("BDD-extraction", ArtifactType::Behavior),
        ("INV-EXT-001", ArtifactType::Invariant),
        ("ADR-001", ArtifactType::Decision),
        ("NFR-001", ArtifactType::NonFunctional),
        ("RN-001", ArtifactType::ReleaseNote),
        ("FASE-3", ArtifactType::Phase),
        ("TASK-F3-012", ArtifactType::Task),
    ];
    for (id, kind) in cases {
        assert_eq!(classify(id), Some(kind), "{id}");
    }
}

#[test]
fn test_classify_unknown() {
    assert_eq!(classify("1a2b3c4"), None);
    assert_eq!(classify("REQUIREMENT"), None);
    assert_eq!(classify(""), None);
}

#[test]
fn test_category_only_for_requirements_and_invariants() {
    assert_eq!(category("REQ-SEC-001", ArtifactType::Requirement), Some("SEC".to_string()));
    assert_eq!(category("INV-EXT-004", ArtifactType::Invariant), Some("EXT".to_string()));
    assert_eq!(category("REQ-001", ArtifactType::Requirement), None);
    assert_eq!(category("TASK-F3-012", ArtifactType::Task), None);
}

#[test]
fn test_task_phase() {
    assert_eq!(task_phase("TASK-F3-012"), Some(3));
    assert_eq!(task_phase("TASK-F10-001"), Some(10));
    assert_eq!(task_phase("REQ-001"), None);
}

// =============================================================================
// HEADINGS
// =============================================================================

#[test]
fn test_heading_with_category_registers_requirement() {
    let m = match_heading("### REQ-SEC-001: Token rotation").unwrap();
    assert_eq!(m.kind, ArtifactType::Requirement);
    assert_eq!(m.id, "REQ-SEC-001");
    assert_eq!(m.title, "Token rotation");
    assert_eq!(category(&m.id, m.kind), Some("SEC".to_string()));
}

#[test]
fn test_category_pattern_is_tried_before_plain_numeric() {
    // The plain pattern would otherwise never see the category token
    let patterns = heading_patterns();
    let qualified = patterns.iter().position(|p| p.as_str().contains(r"REQ-[A-Z]+-")).unwrap();
    let plain = patterns.iter().position(|p| p.as_str().contains(r"(REQ-\d")).unwrap();
    assert!(qualified < plain);

    let m = match_heading("## REQ-PERF-0042 Latency budget").unwrap();
    assert_eq!(m.id, "REQ-PERF-0042");
    assert_eq!(m.title, "Latency budget");
}

#[test]
fn test_heading_title_cleanup() {
    assert_eq!(match_heading("## UC-002 - Login [DRAFT]").unwrap().title, "Login");
    assert_eq!(match_heading("## ADR-003: Use SQLite:").unwrap().title, "Use SQLite");
    assert_eq!(match_heading("# FASE-3").unwrap().title, "");
}

#[test]
fn test_heading_requires_hash_prefix() {
    assert!(match_heading("REQ-001: not a heading").is_none());
    assert!(match_heading("####### REQ-001: too deep").is_none());
    assert!(match_heading("## Overview").is_none());
}

// =============================================================================
// FILENAMES AND TABLES
// =============================================================================

#[test]
fn test_filename_definitions() {
    assert_eq!(match_filename("UC-002-login.md"), vec![(ArtifactType::UseCase, "UC-002".to_string())]);
    assert_eq!(match_filename("API-pdf-reader.md"), vec![(ArtifactType::Api, "API-pdf-reader".to_string())]);
    assert_eq!(match_filename("BDD-extraction.md"), vec![(ArtifactType::Behavior, "BDD-extraction".to_string())]);
    assert!(match_filename("requirements.md").is_empty());
}

#[test]
fn test_title_from_first_heading_strips_id() {
    let doc = lines("intro\n# UC-002: Login\n## Flow\n");
    assert_eq!(title_from_first_heading(&doc, "UC-002"), "Login");
    assert_eq!(title_from_first_heading(&lines("no heading"), "UC-002"), "");
}

#[test]
fn test_table_row_definitions() {
    let found = match_table_row("| REQ-EXT-001 | Parse CVs | High |");
    assert_eq!(found, vec![(ArtifactType::Requirement, "REQ-EXT-001".to_string())]);
    assert!(match_table_row("REQ-EXT-001 outside a table").is_empty());
}

// =============================================================================
// REFERENCES
// =============================================================================

#[test]
fn test_find_ids_in_order() {
    assert_eq!(
        find_ids("See REQ-SEC-001 and UC-002 for details"),
        vec!["REQ-SEC-001".to_string(), "UC-002".to_string()]
    );
}

#[test]
fn test_find_ids_word_guards() {
    assert!(find_ids("XREQ-001").is_empty());
    assert!(find_ids("REQ-0012345").is_empty());
    assert!(find_ids("UC-001-extra").is_empty());
    assert_eq!(find_ids("(REQ-001)"), vec!["REQ-001".to_string()]);
    assert_eq!(find_ids("REQ-001, UC-003."), vec!["REQ-001".to_string(), "UC-003".to_string()]);
}

#[test]
fn test_excluded_prefixes_never_reference() {
    assert!(is_excluded("SEC-001"));
    assert!(is_excluded("API-v1"));
    assert!(find_ids("Audit finding SEC-001 and AMB-002").is_empty());
    assert!(find_ids("GET API-v2-users").is_empty());
    assert!(!is_valid_id("API-v1"));
    assert!(is_valid_id("API-users"));
}
