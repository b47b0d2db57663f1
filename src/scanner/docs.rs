//! Documentation scanner
//!
//! Each file is scanned on its own into a [`FileScan`]: candidate definitions
//! (filename, headings, table rows) and raw references, in line order. Files
//! are scanned in parallel; their partial results are then merged one by one
//! in traversal order, so the registry's first-definition-wins check sees the
//! same order on every run.
//!
//! Reference attribution per line:
//! - two or more distinct ids: every ordered pair among them
//! - exactly one id, different from the file's current context id (the last
//!   heading-defined id): `context -> id`
//! - otherwise nothing

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use super::{collect_files, file_name, read_lines, relative_path};
use crate::config::DocsConfig;
use crate::grammar;
use crate::models::{Artifact, Priority, RawReference};
use crate::registry::ArtifactRegistry;

/// Lines searched before a definition for its priority
const PRIORITY_LINES_BEFORE: usize = 5;

/// Lines searched from a definition onwards for its priority
const PRIORITY_LINES_FROM: usize = 10;

static MOSCOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Must\s+Have|Should\s+Have|Could\s+Have|Won't\s+Have)")
        .expect("moscow pattern is a valid regex")
});

static PRIORITY_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|\s*(Critical|High|Medium|Low)\s*\|").expect("priority cell is a valid regex")
});

/// Definitions and references found in a single file
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// Candidate definitions in discovery order (may repeat ids)
    pub definitions: Vec<Artifact>,
    /// Raw references in line order
    pub references: Vec<RawReference>,
}

/// Result of scanning the whole documentation tree
#[derive(Debug, Clone, Default)]
pub struct DocScan {
    /// Defined artifacts, first definition wins
    pub registry: ArtifactRegistry,
    /// Raw references across all files, in traversal order
    pub references: Vec<RawReference>,
    /// Documentation files found
    pub files_scanned: usize,
}

/// Scan every documentation directory under the project root
#[must_use]
pub fn scan_documents(project_root: &Path, config: &DocsConfig) -> DocScan {
    let files: Vec<_> = config
        .dirs
        .iter()
        .flat_map(|dir| collect_files(&project_root.join(dir), &config.skip_dirs, &config.extensions))
        .collect();
    log::info!("scanning {} documentation files across {:?}", files.len(), config.dirs);

    let partials: Vec<Option<FileScan>> = files
        .par_iter()
        .map(|path| match read_lines(path) {
            Ok(lines) => {
                Some(scan_file(&relative_path(path, project_root), &file_name(path), &lines))
            },
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                None
            },
        })
        .collect();

    let mut scan = merge(partials.into_iter().flatten());
    scan.files_scanned = files.len();
    log::info!(
        "extracted {} artifact definitions and {} raw references",
        scan.registry.len(),
        scan.references.len()
    );
    scan
}

/// Merge per-file results in order through the single registry writer
pub fn merge(partials: impl IntoIterator<Item = FileScan>) -> DocScan {
    let mut scan = DocScan::default();
    for partial in partials {
        for artifact in partial.definitions {
            scan.registry.insert(artifact);
        }
        scan.references.extend(partial.references);
    }
    scan
}

/// Scan one file's lines
///
/// `rel_path` is recorded on definitions and references; `name` is the bare
/// file name used for filename-based definitions.
#[must_use]
pub fn scan_file(rel_path: &str, name: &str, lines: &[String]) -> FileScan {
    let mut scan = FileScan::default();

    for (kind, id) in grammar::match_filename(name) {
        let title = grammar::title_from_first_heading(lines, &id);
        scan.definitions.push(Artifact::new(id, kind, title, rel_path.to_string(), 1));
    }

    let mut context: Option<String> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_num = idx + 1;

        if let Some(heading) = grammar::match_heading(line) {
            let priority = priority_near(lines, idx);
            scan.definitions.push(
                Artifact::new(
                    heading.id.clone(),
                    heading.kind,
                    heading.title,
                    rel_path.to_string(),
                    line_num,
                )
                .with_priority(priority),
            );
            context = Some(heading.id);
        }

        for (kind, id) in grammar::match_table_row(line) {
            let title = title_from_row(line, &id);
            scan.definitions.push(Artifact::new(id, kind, title, rel_path.to_string(), line_num));
        }

        let ids: BTreeSet<String> = grammar::find_ids(line).into_iter().collect();
        attribute(&ids, context.as_deref(), rel_path, line_num, &mut scan.references);
    }

    scan
}

/// Turn the distinct ids of one line into raw references
fn attribute(
    ids: &BTreeSet<String>,
    context: Option<&str>,
    rel_path: &str,
    line: usize,
    out: &mut Vec<RawReference>,
) {
    if ids.len() > 1 {
        for source in ids {
            for target in ids.iter().filter(|t| *t != source) {
                out.push(RawReference::new(source.as_str(), target.as_str(), rel_path, line));
            }
        }
    } else if let (Some(id), Some(ctx)) = (ids.first(), context)
        && id != ctx
    {
        out.push(RawReference::new(ctx, id.as_str(), rel_path, line));
    }
}

/// Title for a table-defined id: the cell after the first cell containing it
fn title_from_row(line: &str, id: &str) -> String {
    let cells: Vec<&str> = line.split('|').map(str::trim).filter(|c| !c.is_empty()).collect();
    cells
        .iter()
        .position(|cell| cell.contains(id))
        .and_then(|i| cells.get(i + 1))
        .map(|cell| (*cell).to_string())
        .unwrap_or_default()
}

/// Priority from MoSCoW phrasing or a priority cell near a definition line
#[must_use]
pub fn priority_near(lines: &[String], idx: usize) -> Option<Priority> {
    let start = idx.saturating_sub(PRIORITY_LINES_BEFORE);
    let end = (idx + PRIORITY_LINES_FROM).min(lines.len());
    lines.get(start..end)?.iter().find_map(|line| {
        if let Some(m) = MOSCOW.find(line) {
            return m.as_str().parse().ok();
        }
        PRIORITY_CELL.captures(line).and_then(|c| c[1].parse().ok())
    })
}
