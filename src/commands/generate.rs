//! Generate command - scan the project and write the traceability graph

use std::path::PathBuf;

use tracegraph::config::Config;
use tracegraph::graph;
use tracegraph::output::{GenerateResult, OutputMode};
use tracegraph::paths;

/// Build the graph and write it into the output directory
pub fn generate(
    project: Option<PathBuf>,
    output: Option<PathBuf>,
    name: Option<String>,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let root = super::project_root(project)?;
    let output_dir = output.unwrap_or_else(|| paths::default_output_dir(&root));
    let name = name.unwrap_or_else(|| super::project_name(&root));

    let config = Config::load(&root);
    let graph = graph::build(&root, &config, &name, &output_dir)?;
    let path = graph::write(&graph, &output_dir)?;

    GenerateResult::from_graph(&graph, &path.display().to_string()).render(output_mode);
    Ok(())
}
