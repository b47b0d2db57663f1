//! Property-based tests for the identifier grammar and edge resolution
//!
//! Uses proptest to verify properties that should hold for all inputs.

use proptest::prelude::*;
use tracegraph::coverage::{Adjacency, CoverageTarget, EvidenceIndex, EvidenceKind, is_covered};
use tracegraph::grammar::{classify, find_ids, is_valid_id};
use tracegraph::models::{ArtifactType, RawReference};
use tracegraph::resolver::resolve;

use crate::common::code_ref;

fn any_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "REQ-[A-Z]{2,4}-[0-9]{3}",
        "REQ-[0-9]{3,4}",
        "UC-[0-9]{3}",
        "WF-[0-9]{3}",
        "INV-[0-9]{3}",
        "ADR-[0-9]{3}",
        "NFR-[0-9]{3}",
        "RN-[0-9]{3}",
        "FASE-[0-9]{1,2}",
        "TASK-F[0-9]-[0-9]{3}",
    ]
}

proptest! {
    /// Every generated id is recognized when embedded in prose
    #[test]
    fn embedded_id_is_found(id in any_id(), before in "[a-z ]{0,10}", after in "[a-z ]{0,10}") {
        let text = format!("{before} {id}. {after}");
        prop_assert_eq!(find_ids(&text), vec![id]);
    }

    /// Every id found is valid and has a type
    #[test]
    fn found_ids_classify(text in "[A-Za-z0-9 ,.:-]{0,60}") {
        for id in find_ids(&text) {
            prop_assert!(is_valid_id(&id));
            prop_assert!(classify(&id).is_some());
        }
    }

    /// A letter glued to the front hides the id
    #[test]
    fn leading_letter_blocks_match(id in "(REQ|UC|WF|ADR|NFR|RN)-[0-9]{3}", letter in "[A-Za-z]") {
        let text = format!("{letter}{id}");
        prop_assert!(find_ids(&text).is_empty());
    }

    /// Classification follows the prefix alone
    #[test]
    fn classify_by_prefix(suffix in "[A-Za-z0-9-]{0,12}") {
        prop_assert_eq!(classify(&format!("UC-{suffix}")), Some(ArtifactType::UseCase));
        prop_assert_eq!(classify(&format!("TASK-{suffix}")), Some(ArtifactType::Task));
    }

    /// Resolving repeated references never yields duplicate edges
    #[test]
    fn resolve_deduplicates(pairs in prop::collection::vec((any_id(), any_id()), 0..20), copies in 1usize..4) {
        let references: Vec<RawReference> = (0..copies)
            .flat_map(|_| pairs.iter())
            .enumerate()
            .map(|(i, (s, t))| RawReference::new(s.as_str(), t.as_str(), "spec/x.md", i + 1))
            .collect();
        let once: Vec<RawReference> = pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| RawReference::new(s.as_str(), t.as_str(), "spec/x.md", i + 1))
            .collect();

        let repeated = resolve(&references);
        let once_edges = resolve(&once);
        prop_assert_eq!(repeated.as_slice(), once_edges.as_slice());
    }

    /// Adding edges never uncovers a requirement
    #[test]
    fn coverage_is_monotone_in_edges(
        base in prop::collection::vec((any_id(), any_id()), 0..15),
        extra in prop::collection::vec((any_id(), any_id()), 0..15),
        tagged in any_id()
    ) {
        let refs = |pairs: &[(String, String)]| -> Vec<RawReference> {
            pairs
                .iter()
                .enumerate()
                .map(|(i, (s, t))| RawReference::new(s.as_str(), t.as_str(), "spec/x.md", i + 1))
                .collect()
        };
        let all: Vec<(String, String)> = base.iter().chain(extra.iter()).cloned().collect();
        let before_edges = resolve(&refs(&base));
        let after_edges = resolve(&refs(&all));
        let before = Adjacency::from_edges(before_edges.as_slice());
        let after = Adjacency::from_edges(after_edges.as_slice());
        let evidence = EvidenceIndex::build(&[code_ref(&[tagged.as_str()])], &[], &[]);

        let targets = [
            CoverageTarget::Kind(ArtifactType::UseCase),
            CoverageTarget::Kind(ArtifactType::Task),
            CoverageTarget::Evidence(EvidenceKind::Code),
        ];
        let ids: Vec<&str> = all
            .iter()
            .flat_map(|(s, t)| [s.as_str(), t.as_str()])
            .chain([tagged.as_str()])
            .collect();
        for id in ids {
            for target in targets {
                if is_covered(id, target, &before, &evidence) {
                    prop_assert!(is_covered(id, target, &after, &evidence));
                }
            }
        }
    }
}
