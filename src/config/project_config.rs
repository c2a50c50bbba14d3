//! Project-level configuration support
//!
//! Loads per-repository configuration from `contextpack.toml` in the
//! repository root. Every field is optional; anything not set falls back
//! to the defaults below.
//!
//! # Configuration Format
//!
//! ```toml
//! # contextpack.toml
//!
//! [routing]
//! high_centrality_threshold = 5.0
//! high_complexity_threshold = 20
//! richness_threshold = 50.0
//! small_utility_richness_ceiling = 20.0
//!
//! [budget]
//! total = 500000
//! oracle = "tokens"   # tokens | chars | words
//! chars_per_token = 4
//!
//! [exclude]
//! dirs = [".git", ".venv", "node_modules", "tests"]
//! skip_test_files = true
//!
//! [output]
//! directory = "out"
//! write_reports = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PackError, PackResult};

/// Name of the per-repository config file
pub const CONFIG_FILE_NAME: &str = "contextpack.toml";

/// Full configuration for one packing run
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct PackConfig {
    #[serde(default)]
    pub routing: RoutingThresholds,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub exclude: ExcludeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Thresholds consumed by the routing engine
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutingThresholds {
    /// Centrality at or above which a file counts as core
    pub high_centrality_threshold: f64,
    /// In-degree at or above which a file counts as core
    pub high_in_degree: usize,
    /// Cyclomatic complexity at or above which a file counts as complex
    pub high_complexity_threshold: u32,
    /// Richness at or above which a non-core file is API-dense
    pub richness_threshold: f64,
    /// Richness below which a file is a cheap utility
    pub small_utility_richness_ceiling: f64,
    /// Coverage above which a complex core file is considered well documented
    pub documented_coverage: f64,
    /// Case-insensitive path markers that force SKIP
    pub skip_markers: Vec<String>,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            high_centrality_threshold: 5.0,
            high_in_degree: 5,
            high_complexity_threshold: 20,
            richness_threshold: 50.0,
            small_utility_richness_ceiling: 20.0,
            documented_coverage: 50.0,
            skip_markers: vec!["test".to_string(), "mock".to_string()],
        }
    }
}

/// Packing budget and the cost model used to measure it
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum size of the assembled document, in oracle units
    pub total: usize,
    /// Cost model: `tokens`, `chars` or `words`
    pub oracle: String,
    /// Characters per token for the `tokens` oracle
    pub chars_per_token: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total: 500_000,
            oracle: "tokens".to_string(),
            chars_per_token: 4,
        }
    }
}

/// Which files are never considered
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExcludeConfig {
    /// Directory names skipped anywhere in the tree
    pub dirs: Vec<String>,
    /// Skip `test_*.py` and `*_test.py`
    pub skip_test_files: bool,
}

impl Default for ExcludeConfig {
    fn default() -> Self {
        Self {
            dirs: [
                ".git",
                ".venv",
                "venv",
                "node_modules",
                "__pycache__",
                "tests",
                "docs",
                "build",
                "dist",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            skip_test_files: true,
        }
    }
}

/// Where the CLI writes artifacts
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; relative paths are resolved against the repository
    pub directory: Option<PathBuf>,
    /// Write blueprint/architecture/manifest alongside the scaffold
    pub write_reports: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            write_reports: true,
        }
    }
}

impl PackConfig {
    /// Resolve the output directory for a repository
    pub fn output_dir(&self, repo_path: &Path) -> PathBuf {
        match &self.output.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => repo_path.join(dir),
            None => repo_path.to_path_buf(),
        }
    }
}

/// Load project configuration from the repository root.
///
/// A missing file yields defaults. An unreadable or invalid file is
/// logged and also yields defaults, so a broken config never stops a run.
pub fn load_project_config(repo_path: &Path) -> PackConfig {
    let toml_path = repo_path.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    PackConfig::default()
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> PackResult<PackConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| PackError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
