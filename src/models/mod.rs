//! Data models for tracegraph
//!
//! Core abstractions:
//! - Artifact: "REQ-SEC-001 is defined in spec/auth.md:12"
//! - Relationship: "UC-002 implements REQ-SEC-001"
//! - Evidence: "commit abc1234 / src/auth.ts / an auth test names REQ-SEC-001"

pub mod artifact;
pub mod evidence;
pub mod relationship;

pub use artifact::{Artifact, ArtifactType, Classification, Priority, Stage};
pub use evidence::{CodeRef, CodeStats, CommitRef, CommitStats, SymbolKind, TestRef, TestStats};
pub use relationship::{RawReference, Relationship, RelationshipType};
