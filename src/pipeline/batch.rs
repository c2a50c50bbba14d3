//! Packing every repository of a workspace
//!
//! A workspace keeps one checkout per subdirectory of `<root>/repos`.
//! Runs share nothing, so repositories are processed in parallel and a
//! failing repository never stops the others.

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Directory under the workspace root holding the repositories
pub const REPOS_DIR: &str = "repos";

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: Vec<String>,
    /// Repository name and error message
    pub failed: Vec<(String, String)>,
    pub elapsed_ms: u128,
}

pub struct BatchRunner {
    repos_dir: PathBuf,
}

impl BatchRunner {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            repos_dir: workspace_root.join(REPOS_DIR),
        }
    }

    /// Non-hidden subdirectories of the repos directory, sorted by name
    pub fn discover(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.repos_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    "Repositories directory not found: {} ({})",
                    self.repos_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut targets: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('.'))
            })
            .collect();
        targets.sort();
        targets
    }

    /// Run `job` for every repository
    pub fn run_all<F>(&self, job: F) -> BatchSummary
    where
        F: Fn(&Path) -> Result<()> + Sync,
    {
        let targets = self.discover();
        if targets.is_empty() {
            warn!("No repositories found in {}", self.repos_dir.display());
            return BatchSummary::default();
        }

        info!("Starting batch run over {} repositories", targets.len());
        let start = Instant::now();

        let results: Vec<(String, Result<()>)> = targets
            .par_iter()
            .map(|repo| {
                let name = super::repo_name(repo);
                let repo_start = Instant::now();
                let result = job(repo);
                match &result {
                    Ok(()) => info!(
                        "Completed {} in {:.2}s",
                        name,
                        repo_start.elapsed().as_secs_f64()
                    ),
                    Err(e) => error!("Failed to pack {}: {:#}", name, e),
                }
                (name, result)
            })
            .collect();

        let mut summary = BatchSummary {
            total: targets.len(),
            ..BatchSummary::default()
        };
        for (name, result) in results {
            match result {
                Ok(()) => summary.succeeded.push(name),
                Err(e) => summary.failed.push((name, format!("{e:#}"))),
            }
        }
        summary.elapsed_ms = start.elapsed().as_millis();

        info!(
            "Batch run complete: {}/{} succeeded in {}ms",
            summary.succeeded.len(),
            summary.total,
            summary.elapsed_ms
        );
        summary
    }
}
