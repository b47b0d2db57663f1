//! Trace command - the requirement-to-test chain through one artifact

use std::path::PathBuf;

use tracegraph::config::Config;
use tracegraph::graph;
use tracegraph::output::OutputMode;
use tracegraph::paths;
use tracegraph::trace;

/// Rebuild the graph and trace the chain through `id`
pub fn trace(id: &str, project: Option<PathBuf>, output_mode: OutputMode) -> anyhow::Result<()> {
    let root = super::project_root(project)?;
    let name = super::project_name(&root);

    let config = Config::load(&root);
    let graph = graph::build(&root, &config, &name, &paths::default_output_dir(&root))?;
    let report = trace::trace(&graph, id)?;

    report.render(output_mode);
    Ok(())
}
