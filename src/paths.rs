//! Centralized path definitions for tracegraph
//!
//! ## Layout
//!
//! ```text
//! project/
//! ├── .tracegraph.toml                # optional scan configuration
//! ├── pipeline-state.json             # optional pipeline snapshot (read-only)
//! ├── spec/ plan/ task/ test/         # documentation tree
//! ├── src/                            # source tree
//! ├── tests/                          # test tree
//! └── dashboard/                      # default output directory
//!     ├── adoption-data.json          # optional adoption snapshot (read-only)
//!     └── traceability-graph.json     # generated graph
//! ```

use std::path::{Path, PathBuf};

/// Project configuration filename
pub const CONFIG_FILE: &str = ".tracegraph.toml";

/// Pipeline status snapshot, at the project root
pub const PIPELINE_STATE_FILE: &str = "pipeline-state.json";

/// Adoption snapshot, in the output directory
pub const ADOPTION_FILE: &str = "adoption-data.json";

/// Generated graph, in the output directory
pub const GRAPH_FILE: &str = "traceability-graph.json";

/// Default output directory name under the project root
pub const DEFAULT_OUTPUT_DIR: &str = "dashboard";

/// Get path to `.tracegraph.toml`
#[must_use]
pub fn config_file(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

/// Get path to `pipeline-state.json`
#[must_use]
pub fn pipeline_state(project_root: &Path) -> PathBuf {
    project_root.join(PIPELINE_STATE_FILE)
}

/// Get the default output directory (`dashboard/`)
#[must_use]
pub fn default_output_dir(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_OUTPUT_DIR)
}

/// Get path to `adoption-data.json`
#[must_use]
pub fn adoption_data(output_dir: &Path) -> PathBuf {
    output_dir.join(ADOPTION_FILE)
}

/// Get path to `traceability-graph.json`
#[must_use]
pub fn graph_file(output_dir: &Path) -> PathBuf {
    output_dir.join(GRAPH_FILE)
}
