//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;
use tracegraph::impact::DEFAULT_MAX_DEPTH;
use tracegraph::output::OutputMode;

/// tracegraph - Traceability graphs from specs, code, tests and commits
#[derive(Parser, Debug)]
#[command(
    name = "tracegraph",
    version,
    about = "Traceability graphs from specs, code, tests and commits",
    long_about = "Extract artifacts (requirements, use cases, tasks, ...) from a project's \
                  documentation,\nlink them through code comments, tests and commit trailers, \
                  and report coverage.\n\n\
                  Writes traceability-graph.json for dashboards and other tools."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the project and write traceability-graph.json
    Generate {
        /// Project root (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Output directory (defaults to <project>/dashboard)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Project display name (defaults to the project directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show what a change to an artifact affects
    Impact {
        /// Artifact ID (e.g. REQ-SEC-001)
        id: String,

        /// Direction: upstream (what it depends on) or downstream (what depends on it)
        #[arg(short, long, default_value = "downstream")]
        direction: String,

        /// Maximum traversal depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        depth: usize,

        /// Project root (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Trace the requirement-to-test chain through an artifact
    Trace {
        /// Artifact ID (e.g. UC-002)
        id: String,

        /// Project root (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List requirements missing use cases, scenarios, code or tests
    Coverage {
        /// Only requirements whose business domain contains this text
        #[arg(long)]
        domain: Option<String>,

        /// Only requirements whose technical layer contains this text
        #[arg(long)]
        layer: Option<String>,

        /// Project root (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Show version
    Version,
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Generate {
            project,
            output,
            name,
        }) => commands::generate(project, output, name, output_mode),
        Some(Command::Impact {
            id,
            direction,
            depth,
            project,
        }) => commands::impact(&id, &direction, depth, project, output_mode),
        Some(Command::Trace { id, project }) => commands::trace(&id, project, output_mode),
        Some(Command::Coverage {
            domain,
            layer,
            project,
        }) => commands::coverage(domain, layer, project, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": tracegraph::VERSION
                    })
                );
            } else {
                println!("tracegraph v{}", tracegraph::VERSION);
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": tracegraph::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("tracegraph v{}", tracegraph::VERSION);
                println!("\nRun 'tracegraph --help' for usage");
                println!("Run 'tracegraph generate' to build the graph");
            }
            Ok(())
        },
    }
}
