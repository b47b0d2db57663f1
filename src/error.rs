//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run
///
/// Everything else (unreadable files, missing trees, git failures, malformed
/// snapshots) degrades to an empty result for that subsystem and is logged.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Project root does not exist
    #[error("project root does not exist: {0}")]
    ProjectRootNotFound(PathBuf),

    /// Project root is not a directory
    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration
    #[error("invalid config: {0}")]
    Config(String),
}

/// Errors from analyses over an assembled graph
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Root id is not a defined artifact
    #[error("artifact not found: {0}")]
    UnknownArtifact(String),
}
