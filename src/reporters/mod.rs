//! Artifacts written after a run
//!
//! - `scaffold.md` - the packed document itself
//! - `blueprint.md` - most central and most complex files
//! - `architecture.md` - run statistics
//! - `manifest.json` - every routing decision with its metrics

mod json;
mod markdown;

pub use json::render_manifest;
pub use markdown::{render_architecture, render_blueprint};

use crate::pipeline::PackOutcome;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SCAFFOLD_FILE: &str = "scaffold.md";
pub const BLUEPRINT_FILE: &str = "blueprint.md";
pub const ARCHITECTURE_FILE: &str = "architecture.md";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Write the scaffold, and the reports unless `with_reports` is false.
/// Returns the written paths.
pub fn write_artifacts(
    outcome: &PackOutcome,
    output_dir: &Path,
    with_reports: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut artifacts = vec![(SCAFFOLD_FILE, outcome.document.text.clone())];
    if with_reports {
        artifacts.push((BLUEPRINT_FILE, render_blueprint(outcome)));
        artifacts.push((ARCHITECTURE_FILE, render_architecture(outcome)));
        artifacts.push((MANIFEST_FILE, render_manifest(outcome)?));
    }

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = output_dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!("Wrote {} artifacts to {}", written.len(), output_dir.display());
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{ComplexityRecord, DependencyRecord, RoutingDecision, Strategy};
    use crate::pack::PackedDocument;
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn deps(in_degree: usize, targets: &[&str], is_entry_point: bool) -> DependencyRecord {
        DependencyRecord {
            in_degree,
            out_degree: targets.len(),
            dependencies: targets.iter().map(|t| t.to_string()).collect(),
            is_entry_point,
        }
    }

    fn complexity(cyclomatic_complexity: u32) -> ComplexityRecord {
        ComplexityRecord {
            cyclomatic_complexity,
            ..ComplexityRecord::default()
        }
    }

    /// Three files: a central config, an entry point importing it, and a
    /// mock that is skipped.
    pub(crate) fn test_outcome() -> PackOutcome {
        let mut dependencies = BTreeMap::new();
        dependencies.insert("core/config.py".to_string(), deps(2, &[], false));
        dependencies.insert(
            "main.py".to_string(),
            deps(0, &["core/config.py", "mock_client.py"], true),
        );
        dependencies.insert(
            "mock_client.py".to_string(),
            deps(1, &["core/config.py"], false),
        );

        let mut complexity_map = BTreeMap::new();
        complexity_map.insert("core/config.py".to_string(), complexity(1));
        complexity_map.insert("main.py".to_string(), complexity(12));
        complexity_map.insert("mock_client.py".to_string(), complexity(3));

        let decision = |path: &str, strategy: Strategy| {
            RoutingDecision::new(
                path.to_string(),
                dependencies[path].clone(),
                complexity_map[path].clone(),
                strategy,
                "test",
            )
        };
        let decisions = vec![
            decision("core/config.py", Strategy::Full),
            decision("main.py", Strategy::Signature),
            decision("mock_client.py", Strategy::Skip),
        ];

        PackOutcome {
            repo_name: "demo".to_string(),
            trace_id: Uuid::new_v4(),
            files_analyzed: 3,
            parse_failures: 0,
            entry_points: BTreeSet::from(["main.py".to_string()]),
            external_imports: BTreeSet::from(["requests".to_string()]),
            dependencies,
            complexity: complexity_map,
            decisions,
            document: PackedDocument {
                text: "# Repository Scaffold: demo\n\n".to_string(),
                total_size: 100,
                budget: 1000,
                included: vec!["core/config.py".to_string(), "main.py".to_string()],
                omitted: Vec::new(),
            },
            elapsed_ms: 5,
        }
    }

    #[test]
    fn test_write_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let written = write_artifacts(&test_outcome(), &out, true).unwrap();

        assert_eq!(written.len(), 4);
        for name in [SCAFFOLD_FILE, BLUEPRINT_FILE, ARCHITECTURE_FILE, MANIFEST_FILE] {
            assert!(out.join(name).is_file(), "{name} should exist");
        }
        assert_eq!(
            fs::read_to_string(out.join(SCAFFOLD_FILE)).unwrap(),
            "# Repository Scaffold: demo\n\n"
        );
    }

    #[test]
    fn test_scaffold_only() {
        let dir = TempDir::new().unwrap();
        let written = write_artifacts(&test_outcome(), dir.path(), false).unwrap();
        assert_eq!(written, vec![dir.path().join(SCAFFOLD_FILE)]);
        assert!(!dir.path().join(MANIFEST_FILE).exists());
    }
}
