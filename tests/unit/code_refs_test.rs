//! Tests for the code reference scanner

use tracegraph::config::CodeConfig;
use tracegraph::models::SymbolKind;
use tracegraph::scanner::code_refs::{scan_code, scan_source};

use crate::common::{TestProject, lines};

fn skip() -> Vec<String> {
    vec!["node_modules".to_string()]
}

#[test]
fn test_refs_tag_attributed_to_declaration_below() {
    let src = lines("// Refs: REQ-001, UC-002\nexport class TokenStore {\n}\n");
    let (refs, symbols, attributed) = scan_source("src/store.ts", "store.ts", &src);
    assert_eq!((symbols, attributed), (1, 1));
    assert_eq!(refs[0].symbol, "TokenStore");
    assert_eq!(refs[0].symbol_type, SymbolKind::Class);
    assert_eq!(refs[0].ref_ids, vec!["REQ-001", "UC-002"]);
    assert_eq!(refs[0].line, 1);
}

#[test]
fn test_trailing_comment_shorthand() {
    let src = lines("const limit = 5; // NFR-003\n");
    let (refs, _, _) = scan_source("src/limits.ts", "limits.ts", &src);
    assert_eq!(refs[0].ref_ids, vec!["NFR-003"]);
    assert_eq!(refs[0].symbol, "limit");
    assert_eq!(refs[0].symbol_type, SymbolKind::Const);
}

#[test]
fn test_distant_declaration_falls_back_to_file_line() {
    let src = lines("function far() {}\n\n\n\n// Refs: REQ-001\n");
    let (refs, symbols, attributed) = scan_source("src/far.ts", "far.ts", &src);
    assert_eq!(symbols, 1);
    assert_eq!(attributed, 0);
    assert_eq!(refs[0].symbol, "far.ts:5");
    assert_eq!(refs[0].symbol_type, SymbolKind::Unknown);
}

#[test]
fn test_lines_without_tags_are_inert() {
    let src = lines("// mentions REQ-001 in prose\nfunction f() {}\n");
    let (refs, symbols, _) = scan_source("src/f.ts", "f.ts", &src);
    assert!(refs.is_empty());
    assert_eq!(symbols, 1);
}

#[test]
fn test_scan_code_extensions_and_stats() {
    let project = TestProject::new();
    project.add_file("src/auth.ts", "// Refs: REQ-SEC-001\nexport function rotate() {}\n");
    project.add_file("src/ui/view.tsx", "const View = 1; // UC-002\n");
    project.add_file("src/readme.md", "// Refs: REQ-009\n");
    project.add_file("src/node_modules/dep.js", "// Refs: REQ-010\n");

    let scan = scan_code(project.path(), &CodeConfig::default(), &skip());
    assert_eq!(scan.stats.total_files, 2);
    assert_eq!(scan.stats.total_symbols, 2);
    assert_eq!(scan.stats.symbols_with_refs, 2);
    assert_eq!(scan.refs[0].file, "src/auth.ts");
    assert_eq!(scan.refs[1].file, "src/ui/view.tsx");
}

#[test]
fn test_missing_source_tree() {
    let project = TestProject::new();
    let scan = scan_code(project.path(), &CodeConfig::default(), &skip());
    assert!(scan.refs.is_empty());
    assert_eq!(scan.stats.total_files, 0);
}

#[test]
fn test_versioned_api_ids_are_not_references() {
    let src = lines("// Refs: API-v1, REQ-001\nexport function handler() {}\nconst version = 2; // API-v2\n");
    let (refs, _, _) = scan_source("src/api.ts", "api.ts", &src);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].ref_ids, vec!["REQ-001"]);
    assert_eq!(refs[0].line, 1);
}
