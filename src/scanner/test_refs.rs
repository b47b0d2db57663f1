//! Test reference scanner
//!
//! Reads test files top to bottom, remembering the last `describe(...)` label.
//! A line yields a [`TestRef`] when it names ids through a `Refs:` tag or
//! inside a `describe`/`it`/`test` description.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{collect_files, file_name, read_lines, refs_tag_ids, relative_path};
use crate::config::TestsConfig;
use crate::grammar;
use crate::models::{TestRef, TestStats};

static DESCRIBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"describe\(\s*['"`](.*?)['"`]"#).expect("describe pattern is a valid regex")
});

static TEST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:it|test)\(\s*['"`](.*?)['"`]"#).expect("test block pattern is a valid regex")
});

static DESCRIPTION_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:describe|it|test)\(\s*['"`](.*?(?:REQ|UC|INV|BDD|WF|API|ADR|NFR)-[A-Za-z0-9-]+.*?)['"`]"#,
    )
    .expect("description ref pattern is a valid regex")
});

/// Result of the test reference scan
#[derive(Debug, Clone, Default)]
pub struct TestScan {
    /// Test references in traversal order
    pub refs: Vec<TestRef>,
    /// Totals
    pub stats: TestStats,
}

/// Scan every test tree
#[must_use]
pub fn scan_tests(project_root: &Path, config: &TestsConfig, skip_dirs: &[String]) -> TestScan {
    let mut scan = TestScan::default();

    for dir in &config.dirs {
        for path in collect_files(&project_root.join(dir), skip_dirs, &config.extensions) {
            scan.stats.total_test_files += 1;
            let lines = match read_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    log::warn!("cannot read {}: {e}", path.display());
                    continue;
                },
            };
            let (refs, tests) = scan_test_file(
                &relative_path(&path, project_root),
                &file_name(&path),
                &lines,
                &config.framework,
            );
            scan.stats.total_tests += tests;
            scan.stats.tests_with_refs += refs.len();
            scan.refs.extend(refs);
        }
    }

    log::info!(
        "tests: {} files, {} tests, {} with refs",
        scan.stats.total_test_files,
        scan.stats.total_tests,
        scan.stats.tests_with_refs
    );
    scan
}

/// Scan one test file
///
/// Returns the references found and the number of test declarations.
#[must_use]
pub fn scan_test_file(
    rel_path: &str,
    name: &str,
    lines: &[String],
    framework: &str,
) -> (Vec<TestRef>, usize) {
    let mut refs = Vec::new();
    let mut tests = 0;
    let mut group = String::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(c) = DESCRIBE.captures(line) {
            group = c[1].to_string();
        }

        let test_name = TEST_BLOCK.captures(line).map(|c| c[1].to_string());
        if test_name.is_some() {
            tests += 1;
        }

        let mut ref_ids = refs_tag_ids(line);
        if let Some(c) = DESCRIPTION_REF.captures(line) {
            for id in grammar::find_ids(&c[1]) {
                if !ref_ids.contains(&id) {
                    ref_ids.push(id);
                }
            }
        }
        if ref_ids.is_empty() {
            continue;
        }

        let test_name = match test_name {
            Some(t) if !group.is_empty() => format!("{group} > {t}"),
            Some(t) => t,
            None if !group.is_empty() => group.clone(),
            None => format!("{name}:{}", idx + 1),
        };

        refs.push(TestRef {
            file: rel_path.to_string(),
            line: idx + 1,
            test_name,
            framework: framework.to_string(),
            ref_ids,
        });
    }

    (refs, tests)
}
