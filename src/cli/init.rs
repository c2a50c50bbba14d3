//! Init command - write a contextpack.toml with the defaults spelled out

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = r#"# contextpack configuration

[routing]
# Files above either are "core"
high_centrality_threshold = 5.0
high_in_degree = 5
high_complexity_threshold = 20
richness_threshold = 50.0
# Below this richness a non-core file is included verbatim
small_utility_richness_ceiling = 20.0
# Core files documented above this get signatures only
documented_coverage = 50.0
# Paths containing any of these (case-insensitive) are skipped
skip_markers = ["test", "mock"]

[budget]
total = 500000
oracle = "tokens"   # tokens | chars | words
chars_per_token = 4

[exclude]
dirs = [".git", ".venv", "venv", "node_modules", "__pycache__", "tests", "docs", "build", "dist"]
skip_test_files = true

[output]
# directory = "context"
write_reports = true
"#;

pub fn run(path: &Path) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    let config_path = repo_path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("Already initialized: {}", config_path.display());
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {}", config_path.display());
    Ok(())
}
