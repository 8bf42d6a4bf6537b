use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which built-in split policy the planner uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitPolicyKind {
    #[default]
    Junction,
    WaterbodiesAndJunctions,
}

/// Planning options, usually read from a TOML file next to the route-link
/// data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub split_policy: SplitPolicyKind,
    /// Reject per-outlet partitions whose basins overlap.
    #[serde(default = "default_true")]
    pub check_disjoint: bool,
    /// Plan each outlet's upstream basin independently.
    #[serde(default)]
    pub partition_by_outlet: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            split_policy: SplitPolicyKind::default(),
            check_disjoint: default_true(),
            partition_by_outlet: false,
        }
    }
}

impl PlanConfig {
    /// Parse a TOML document; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or names an
    /// unknown split policy.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).context("Failed to parse plan config")
    }

    /// Load from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

const fn default_true() -> bool {
    true
}
