//! JSON manifest of a run
//!
//! Lists every routing decision in packing order with both metric records,
//! so a consumer can see why each file got its strategy.

use crate::models::{ComplexityRecord, DependencyRecord, Strategy};
use crate::pipeline::PackOutcome;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    repo_name: &'a str,
    trace_id: Uuid,
    generated_at: DateTime<Utc>,
    budget: usize,
    total_size: usize,
    files_analyzed: usize,
    parse_failures: usize,
    external_imports: &'a BTreeSet<String>,
    entry_points: &'a BTreeSet<String>,
    decisions: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    file_path: &'a str,
    strategy: Strategy,
    reason: &'a str,
    priority_rank: u8,
    centrality: f64,
    included: bool,
    dependency: &'a DependencyRecord,
    complexity: &'a ComplexityRecord,
}

/// Render the manifest as pretty-printed JSON
pub fn render_manifest(outcome: &PackOutcome) -> Result<String> {
    let included: BTreeSet<&str> = outcome
        .document
        .included
        .iter()
        .map(String::as_str)
        .collect();

    let manifest = Manifest {
        repo_name: &outcome.repo_name,
        trace_id: outcome.trace_id,
        generated_at: Utc::now(),
        budget: outcome.document.budget,
        total_size: outcome.document.total_size,
        files_analyzed: outcome.files_analyzed,
        parse_failures: outcome.parse_failures,
        external_imports: &outcome.external_imports,
        entry_points: &outcome.entry_points,
        decisions: outcome
            .decisions
            .iter()
            .map(|d| ManifestEntry {
                file_path: &d.file_path,
                strategy: d.strategy,
                reason: d.reason,
                priority_rank: d.priority_rank,
                centrality: d.centrality(),
                included: included.contains(d.file_path.as_str()),
                dependency: &d.dependency,
                complexity: &d.complexity,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&manifest)?)
}
