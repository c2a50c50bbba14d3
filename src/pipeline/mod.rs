//! Context pack pipeline
//!
//! Runs the phases for one repository, strictly one after another:
//! 1. Collect source files
//! 2. Build the dependency graph
//! 3. Compute complexity metrics
//! 4. Route every file to an extraction strategy
//! 5. Extract and pack under the budget
//!
//! Only a missing or invalid repository root fails the run. Everything
//! that goes wrong for a single file is logged and absorbed.

pub mod batch;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PackConfig;
use crate::context::RunContext;
use crate::files::{collect_source_files, validate_repo_root, IgnorePolicy};
use crate::graph::DependencyGraphBuilder;
use crate::metrics::ComplexityAnalyzer;
use crate::models::{ComplexityRecord, DependencyRecord, RoutingDecision};
use crate::pack::{Assembler, OracleKind, PackedDocument};
use crate::routing::RoutingEngine;

/// Everything a single run produced
#[derive(Debug, Clone, Serialize)]
pub struct PackOutcome {
    pub repo_name: String,
    pub trace_id: Uuid,
    /// Files handed to the analyzers
    pub files_analyzed: usize,
    /// Files the graph builder could not parse
    pub parse_failures: usize,
    pub dependencies: BTreeMap<String, DependencyRecord>,
    pub complexity: BTreeMap<String, ComplexityRecord>,
    pub external_imports: BTreeSet<String>,
    pub entry_points: BTreeSet<String>,
    /// In packing order
    pub decisions: Vec<RoutingDecision>,
    pub document: PackedDocument,
    pub elapsed_ms: u128,
}

pub struct Pipeline {
    config: PackConfig,
}

impl Pipeline {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// Run every phase over `repo_path`
    pub fn run(&self, repo_path: &Path) -> Result<PackOutcome> {
        validate_repo_root(repo_path)?;
        let repo_path = repo_path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", repo_path.display()))?;

        let ctx = RunContext::new(repo_name(&repo_path));
        let _run = ctx.span().entered();
        let start = Instant::now();
        info!("Packing {}", repo_path.display());

        let policy = IgnorePolicy::new(&self.config.exclude);
        let files = collect_source_files(&repo_path, &policy)?;
        info!("Found {} source files", files.len());

        let graph = DependencyGraphBuilder::new(&repo_path).build(&ctx, &files);
        let complexity = ComplexityAnalyzer::new(&repo_path).analyze_repo(&ctx, &files);

        let decisions = RoutingEngine::new(self.config.routing.clone()).route_all(
            &ctx,
            &graph.records,
            &complexity,
        );

        let oracle = self.oracle_kind().build(self.config.budget.chars_per_token);
        let document =
            Assembler::new(&repo_path, oracle, self.config.budget.total).assemble(&ctx, &decisions);

        let elapsed_ms = start.elapsed().as_millis();
        info!(
            "Packed {} of {} files in {}ms",
            document.included.len(),
            decisions.len(),
            elapsed_ms
        );

        Ok(PackOutcome {
            repo_name: ctx.repo_name().to_string(),
            trace_id: ctx.trace_id(),
            files_analyzed: files.len(),
            parse_failures: graph.parse_failures,
            dependencies: graph.records,
            complexity,
            external_imports: graph.external_imports,
            entry_points: graph.entry_points,
            decisions,
            document,
            elapsed_ms,
        })
    }

    fn oracle_kind(&self) -> OracleKind {
        self.config.budget.oracle.parse().unwrap_or_else(|e| {
            warn!("{}; falling back to tokens", e);
            OracleKind::Tokens
        })
    }
}

/// Directory name of the repository, used as the document title
pub fn repo_name(repo_path: &Path) -> String {
    repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string())
}
