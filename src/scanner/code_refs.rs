//! Code reference scanner
//!
//! Finds traceability tags in source files and attributes each to the
//! declaration next to it:
//!
//! ```text
//! /** Refs: REQ-SEC-001, UC-002 */
//! export async function rotateToken() {   // attributed to `rotateToken`
//!
//! const limit = 5; // NFR-003             // attributed to `limit`
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{collect_files, file_name, read_lines, refs_tag_ids, relative_path};
use crate::config::CodeConfig;
use crate::grammar;
use crate::models::{CodeRef, CodeStats, SymbolKind};

/// Declarations further than this from a tag are not attributed to it
const SYMBOL_WINDOW: usize = 2;

static INLINE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\s*((?:REQ|UC|INV|RN|WF|API|BDD|ADR|NFR)-[A-Za-z0-9-]+)")
        .expect("inline ref is a valid regex")
});

static SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:async\s+)?\b(function|class|const|let|var|interface|type|enum)\s+(\w+)",
    )
    .expect("symbol pattern is a valid regex")
});

/// Result of the code reference scan
#[derive(Debug, Clone, Default)]
pub struct CodeScan {
    /// Tags in traversal order
    pub refs: Vec<CodeRef>,
    /// Totals
    pub stats: CodeStats,
}

/// A declaration line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Symbol {
    idx: usize,
    name: String,
    kind: SymbolKind,
}

/// Scan the source tree
#[must_use]
pub fn scan_code(project_root: &Path, config: &CodeConfig, skip_dirs: &[String]) -> CodeScan {
    let mut scan = CodeScan::default();

    for path in collect_files(&project_root.join(&config.dir), skip_dirs, &config.extensions) {
        scan.stats.total_files += 1;
        let lines = match read_lines(&path) {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                continue;
            },
        };
        let (refs, symbols, attributed) =
            scan_source(&relative_path(&path, project_root), &file_name(&path), &lines);
        scan.stats.total_symbols += symbols;
        scan.stats.symbols_with_refs += attributed;
        scan.refs.extend(refs);
    }

    log::info!(
        "code: {} files, {} symbols, {} with refs, {} ref comments",
        scan.stats.total_files,
        scan.stats.total_symbols,
        scan.stats.symbols_with_refs,
        scan.refs.len()
    );
    scan
}

/// Scan one source file
///
/// Returns the tags found, the number of declarations and the number of tags
/// attributed to a declaration.
#[must_use]
pub fn scan_source(rel_path: &str, name: &str, lines: &[String]) -> (Vec<CodeRef>, usize, usize) {
    let symbols: Vec<Symbol> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            SYMBOL.captures(line).map(|c| Symbol {
                idx,
                name: c[2].to_string(),
                kind: SymbolKind::from_keyword(&c[1]),
            })
        })
        .collect();

    let mut refs = Vec::new();
    let mut attributed = 0;

    for (idx, line) in lines.iter().enumerate() {
        let ref_ids = line_ref_ids(line);
        if ref_ids.is_empty() {
            continue;
        }

        let (symbol, symbol_type) = match nearest_symbol(&symbols, idx) {
            Some(s) => {
                attributed += 1;
                (s.name.clone(), s.kind)
            },
            None => (format!("{name}:{}", idx + 1), SymbolKind::Unknown),
        };

        refs.push(CodeRef {
            file: rel_path.to_string(),
            line: idx + 1,
            symbol,
            symbol_type,
            ref_ids,
        });
    }

    (refs, symbols.len(), attributed)
}

/// Ids tagged on a line: a `Refs:` tag, else a single trailing `// ID` comment
fn line_ref_ids(line: &str) -> Vec<String> {
    let ids = refs_tag_ids(line);
    if !ids.is_empty() {
        return ids;
    }
    INLINE_REF
        .captures(line)
        .map(|c| c[1].to_string())
        .filter(|id| !grammar::is_excluded(id))
        .into_iter()
        .collect()
}

/// The last declaration within two lines of `idx`, before or after
fn nearest_symbol(symbols: &[Symbol], idx: usize) -> Option<&Symbol> {
    symbols
        .iter()
        .rev()
        .find(|s| s.idx <= idx + SYMBOL_WINDOW)
        .filter(|s| s.idx + SYMBOL_WINDOW >= idx)
}
