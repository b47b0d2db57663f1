//! Read-only snapshots produced by other tools
//!
//! Both files are optional and passed through without interpretation beyond
//! picking out the few fields the graph exposes. A missing file gives the
//! defaults; a malformed one is logged and also gives the defaults.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::paths;

/// Stage status when the snapshot does not say
pub const UNKNOWN: &str = "unknown";

/// Pipeline status snapshot (`pipeline-state.json`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineSnapshot {
    /// Current stage name, if recorded
    pub current_stage: Option<String>,
    /// Raw per-stage records keyed by stage name
    pub stages: Map<String, Value>,
}

/// Status and last run of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    /// Recorded status, or `unknown`
    pub status: String,
    /// Recorded last run, passed through as-is
    pub last_run: Option<Value>,
}

impl PipelineSnapshot {
    /// Parse a snapshot document
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self {
            current_stage: value
                .get("currentStage")
                .and_then(Value::as_str)
                .map(String::from),
            stages: value
                .get("stages")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Load from the project root
    #[must_use]
    pub fn load(project_root: &Path) -> Self {
        load_or_default(&paths::pipeline_state(project_root), Self::from_json_str)
    }

    /// Current stage name, or `unknown`
    #[must_use]
    pub fn current_stage(&self) -> &str {
        self.current_stage.as_deref().unwrap_or(UNKNOWN)
    }

    /// Status of a stage by name
    #[must_use]
    pub fn stage(&self, name: &str) -> StageStatus {
        let record = self.stages.get(name);
        StageStatus {
            status: record
                .and_then(|r| r.get("status"))
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN)
                .to_string(),
            last_run: record.and_then(|r| r.get("lastRun")).filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Adoption snapshot (`adoption-data.json` in the output directory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdoptionSnapshot {
    /// `adoption` object, or `{"present": false}`
    pub adoption: Value,
    /// `adoptionStats` value, if any
    pub adoption_stats: Option<Value>,
}

impl Default for AdoptionSnapshot {
    fn default() -> Self {
        Self {
            adoption: json!({ "present": false }),
            adoption_stats: None,
        }
    }
}

impl AdoptionSnapshot {
    /// Parse a snapshot document
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            adoption: value.get("adoption").cloned().unwrap_or(defaults.adoption),
            adoption_stats: value.get("adoptionStats").filter(|v| !v.is_null()).cloned(),
        })
    }

    /// Load from the output directory
    #[must_use]
    pub fn load(output_dir: &Path) -> Self {
        load_or_default(&paths::adoption_data(output_dir), Self::from_json_str)
    }
}

fn load_or_default<T: Default>(path: &Path, parse: fn(&str) -> serde_json::Result<T>) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => parse(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed {}: {e}", path.display());
            T::default()
        }),
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            T::default()
        },
    }
}
