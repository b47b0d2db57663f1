//! Tests for project configuration

use std::time::Duration;

use tracegraph::config::Config;
use tracegraph::error::TraceError;

use crate::common::TestProject;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.docs.dirs, vec!["spec", "plan", "task", "test"]);
    assert!(config.docs.skip_dirs.iter().any(|d| d == ".git"));
    assert_eq!(config.code.dir, "src");
    assert_eq!(config.tests.dirs, vec!["tests", "test"]);
    assert_eq!(config.tests.framework, "vitest");
    assert!(config.git.enabled);
    assert_eq!(config.git.timeout(), Duration::from_secs(30));
    assert_eq!(config.report.limit, 50);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = Config::from_toml_str(
        r#"
[code]
dir = "lib"

[git]
enabled = false
"#,
    )
    .unwrap();
    assert_eq!(config.code.dir, "lib");
    assert_eq!(config.code.extensions, Config::default().code.extensions);
    assert!(!config.git.enabled);
    assert_eq!(config.git.timeout_secs, 30);
    assert_eq!(config.docs, Config::default().docs);
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let err = Config::from_toml_str("[docs\ndirs = 1").unwrap_err();
    assert!(matches!(err, TraceError::Config(_)));
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let project = TestProject::new();
    assert_eq!(Config::load(project.path()), Config::default());
}

#[test]
fn test_load_reads_project_file() {
    let project = TestProject::new();
    project.add_file(".tracegraph.toml", "[report]\nlimit = 5\n\n[tests]\nframework = \"jest\"\n");
    let config = Config::load(project.path());
    assert_eq!(config.report.limit, 5);
    assert_eq!(config.tests.framework, "jest");
}

#[test]
fn test_load_malformed_file_gives_defaults() {
    let project = TestProject::new();
    project.add_file(".tracegraph.toml", "limit = [");
    assert_eq!(Config::load(project.path()), Config::default());
}
