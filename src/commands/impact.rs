//! Impact command - blast radius of changing one artifact

use std::path::PathBuf;

use anyhow::anyhow;
use tracegraph::config::Config;
use tracegraph::graph;
use tracegraph::impact::{self, Direction};
use tracegraph::output::OutputMode;
use tracegraph::paths;

/// Rebuild the graph and report what a change to `id` affects
pub fn impact(
    id: &str,
    direction: &str,
    depth: usize,
    project: Option<PathBuf>,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let direction: Direction = direction.parse().map_err(|e: String| anyhow!(e))?;
    let root = super::project_root(project)?;
    let name = super::project_name(&root);

    let config = Config::load(&root);
    let graph = graph::build(&root, &config, &name, &paths::default_output_dir(&root))?;
    let report = impact::analyze(&graph, id, direction, depth)?;

    report.render(output_mode);
    Ok(())
}
