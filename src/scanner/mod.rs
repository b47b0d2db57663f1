//! Scanners over the project's input trees
//!
//! Four independent, side-effect-free scanners:
//! - `docs` - documentation tree: definitions and raw references
//! - `commits` - git history: `Task:` / `Refs:` trailers
//! - `code_refs` - source tree: `Refs:` tags and trailing id comments
//! - `test_refs` - test trees: `Refs:` tags and ids in test descriptions
//!
//! Every walk is deterministic (files before subdirectories, both by name)
//! and a missing tree simply yields nothing.

pub mod code_refs;
pub mod commits;
pub mod docs;
pub mod test_refs;

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::grammar;

/// Explicit multi-id tag in code and tests: `Refs: REQ-001, UC-002`
static REFS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Refs?:\s*((?:(?:REQ|UC|INV|RN|WF|API|BDD|ADR|NFR|FASE|TASK)-[A-Za-z0-9-]+(?:,\s*)?)+)",
    )
    .expect("refs tag is a valid regex")
});

static TAG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("tag separator is a valid regex"));

/// Ids listed by a `Refs:` tag on this line, if any
pub(crate) fn refs_tag_ids(line: &str) -> Vec<String> {
    let Some(caps) = REFS_TAG.captures(line) else {
        return Vec::new();
    };
    TAG_SEPARATOR
        .split(&caps[1])
        .map(str::trim)
        .filter(|id| !id.is_empty() && grammar::classify(id).is_some())
        .filter(|id| !grammar::is_excluded(id))
        .map(String::from)
        .collect()
}

/// Collect files under `root` whose extension is in `extensions`
///
/// Directories named in `skip_dirs` are not descended into. Files of a
/// directory come before its subdirectories, each sorted by name.
pub fn collect_files(root: &Path, skip_dirs: &[String], extensions: &[String]) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e, skip_dirs))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("cannot walk {}: {e}", root.display());
                None
            },
        })
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extensions))
        .map(DirEntry::into_path)
        .collect()
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_skipped(entry: &DirEntry, skip_dirs: &[String]) -> bool {
    entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| skip_dirs.iter().any(|s| s == name))
}

/// Case-insensitive extension check (`md` matches `README.MD`)
#[must_use]
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.trim_start_matches('.').eq_ignore_ascii_case(ext)))
}

/// Read a file as lines, replacing invalid UTF-8 and trailing whitespace
pub fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).lines().map(|l| l.trim_end().to_string()).collect())
}

/// Project-relative path with forward slashes
#[must_use]
pub fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Bare file name, lossy
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}
