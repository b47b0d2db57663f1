//! tracegraph - Extracts a traceability graph from a project's documentation,
//! source code, tests and git history
//!
//! This library provides the extraction-and-graph engine: identifier grammar,
//! scanners, relationship resolution, coverage and classification, and the
//! assembly of the `traceability-graph-v3` structure. Impact, chain and gap
//! analyses run over the assembled graph.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod classification;
pub mod config;
pub mod coverage;
pub mod error;
pub mod gaps;
pub mod grammar;
pub mod graph;
pub mod impact;
pub mod models;
pub mod output;
pub mod paths;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod snapshot;
pub mod trace;
