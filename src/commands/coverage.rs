//! Coverage command - missing links per requirement

use std::path::PathBuf;

use tracegraph::config::Config;
use tracegraph::gaps::{self, GapFilter};
use tracegraph::graph;
use tracegraph::output::OutputMode;
use tracegraph::paths;

/// Rebuild the graph and report requirement coverage gaps
pub fn coverage(
    domain: Option<String>,
    layer: Option<String>,
    project: Option<PathBuf>,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let root = super::project_root(project)?;
    let name = super::project_name(&root);

    let config = Config::load(&root);
    let graph = graph::build(&root, &config, &name, &paths::default_output_dir(&root))?;
    let report = gaps::analyze(&graph, &GapFilter { domain, layer });

    report.render(output_mode);
    Ok(())
}
