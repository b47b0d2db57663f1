//! Command implementations

mod coverage;
mod generate;
mod impact;
mod trace;

pub use coverage::coverage;
pub use generate::generate;
pub use impact::impact;
pub use trace::trace;

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Resolve the project root, defaulting to the current directory
fn project_root(project: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match project {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

/// Display name from the project directory
fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().to_string())
}
