//! Project configuration
//!
//! Optional `.tracegraph.toml` at the project root. Every field has a default,
//! so a missing file, a missing section or a missing key all fall back to the
//! standard layout:
//!
//! ```toml
//! [docs]
//! dirs = ["spec", "plan", "task", "test"]
//!
//! [code]
//! dir = "src"
//!
//! [git]
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::paths;

/// Top-level project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Documentation tree
    #[serde(default)]
    pub docs: DocsConfig,
    /// Source tree
    #[serde(default)]
    pub code: CodeConfig,
    /// Test trees
    #[serde(default)]
    pub tests: TestsConfig,
    /// Commit history
    #[serde(default)]
    pub git: GitConfig,
    /// Report limits
    #[serde(default)]
    pub report: ReportConfig,
}

/// Documentation scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Top-level directories scanned for definitions and references
    #[serde(default = "default_doc_dirs")]
    pub dirs: Vec<String>,
    /// Directory names never descended into (applies to every tree)
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// Extensions of documentation files
    #[serde(default = "default_doc_extensions")]
    pub extensions: Vec<String>,
}

/// Source scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Source root, relative to the project
    #[serde(default = "default_code_dir")]
    pub dir: String,
    /// Source file extensions
    #[serde(default = "default_script_extensions")]
    pub extensions: Vec<String>,
}

/// Test scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestsConfig {
    /// Test roots, relative to the project
    #[serde(default = "default_test_dirs")]
    pub dirs: Vec<String>,
    /// Test file extensions
    #[serde(default = "default_script_extensions")]
    pub extensions: Vec<String>,
    /// Framework label recorded on test references
    #[serde(default = "default_framework")]
    pub framework: String,
}

/// Commit scan settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Scan commit history at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Upper bound on each git invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Report settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Cap on reported orphans and broken references
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_doc_dirs() -> Vec<String> {
    ["spec", "plan", "task", "test"].map(String::from).to_vec()
}

fn default_skip_dirs() -> Vec<String> {
    [".git", ".claude", "node_modules", "__pycache__", "dashboard", "temp_files"]
        .map(String::from)
        .to_vec()
}

fn default_doc_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_code_dir() -> String {
    "src".to_string()
}

fn default_script_extensions() -> Vec<String> {
    ["ts", "js", "tsx", "jsx"].map(String::from).to_vec()
}

fn default_test_dirs() -> Vec<String> {
    vec!["tests".to_string(), "test".to_string()]
}

fn default_framework() -> String {
    "vitest".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_limit() -> usize {
    50
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dirs: default_doc_dirs(),
            skip_dirs: default_skip_dirs(),
            extensions: default_doc_extensions(),
        }
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            dir: default_code_dir(),
            extensions: default_script_extensions(),
        }
    }
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            dirs: default_test_dirs(),
            extensions: default_script_extensions(),
            framework: default_framework(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl GitConfig {
    /// Timeout as a duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse a configuration document
    pub fn from_toml_str(content: &str) -> Result<Self, TraceError> {
        toml::from_str(content).map_err(|e| TraceError::Config(e.to_string()))
    }

    /// Load `.tracegraph.toml` from the project root
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// logged and also yields the defaults.
    #[must_use]
    pub fn load(project_root: &Path) -> Self {
        let path = paths::config_file(project_root);
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path)
            .map_err(TraceError::from)
            .and_then(|content| Self::from_toml_str(&content))
        {
            Ok(config) => {
                log::debug!("loaded {}", path.display());
                config
            },
            Err(e) => {
                log::warn!("ignoring {}: {e}", path.display());
                Self::default()
            },
        }
    }
}
