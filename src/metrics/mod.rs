//! Per-file complexity and documentation metrics
//!
//! Independent of the dependency graph: every file is parsed on its own and
//! reduced to a [`ComplexityRecord`]. Files that fail to parse get no
//! record; downstream code treats them as all-zero.

use crate::context::RunContext;
use crate::error::PackResult;
use crate::models::{round2, ComplexityRecord};
use crate::parsers::python;

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tree_sitter::Node;

/// Node kinds that each add one decision point
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "while_statement",
    "for_statement",
    "with_statement",
    "except_clause",
    "except_group_clause",
];

pub struct ComplexityAnalyzer {
    repo_path: PathBuf,
}

impl ComplexityAnalyzer {
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// Analyze every file, keyed by its repository-relative path
    pub fn analyze_repo(
        &self,
        ctx: &RunContext,
        files: &[String],
    ) -> BTreeMap<String, ComplexityRecord> {
        let _span = ctx.phase("complexity").entered();
        info!("Starting complexity analysis of {} files", files.len());

        let results: Vec<(String, Option<ComplexityRecord>)> = files
            .par_iter()
            .map(|rel| {
                let record = match self.analyze_file(&self.repo_path.join(rel)) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(trace_id = %ctx.trace_id(), "Skipping metrics for {}: {}", rel, e);
                        None
                    }
                };
                (rel.clone(), record)
            })
            .collect();

        let metrics: BTreeMap<String, ComplexityRecord> = results
            .into_iter()
            .filter_map(|(rel, record)| record.map(|r| (rel, r)))
            .collect();

        info!("Complexity analysis complete: {} files", metrics.len());
        metrics
    }

    pub fn analyze_file(&self, path: &Path) -> PackResult<ComplexityRecord> {
        let source = python::read_source(path)?;
        analyze_source(&source, path)
    }
}

/// Compute metrics for one source text
pub fn analyze_source(source: &str, path: &Path) -> PackResult<ComplexityRecord> {
    let tree = python::parse_source(source, path)?;
    let root = tree.root_node();

    let loc = count_loc(source);
    let mut walk = Walk::default();
    python::walk_named(&root, |node| {
        walk.count(node, source);
        true
    });

    let documentation_coverage = if walk.api_count == 0 {
        100.0
    } else {
        round2(walk.documented as f64 / walk.api_count as f64 * 100.0)
    };
    let richness = (walk.api_count as f64 * 5.0 + loc as f64 / 50.0).min(100.0);

    Ok(ComplexityRecord {
        loc,
        api_count: walk.api_count,
        cyclomatic_complexity: walk.complexity,
        documentation_coverage,
        context_richness_score: round2(richness),
    })
}

/// Non-blank lines that are not pure `#` comments. A cost proxy, not a
/// precise line count: lines inside multi-line strings are counted too.
pub fn count_loc(source: &str) -> usize {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count()
}

/// Counters accumulated over one pass of [`python::walk_named`]
struct Walk {
    api_count: usize,
    documented: usize,
    complexity: u32,
}

impl Default for Walk {
    fn default() -> Self {
        Self {
            api_count: 0,
            documented: 0,
            complexity: 1,
        }
    }
}

impl Walk {
    fn count(&mut self, node: &Node, source: &str) {
        let kind = node.kind();

        if python::is_function(node) || python::is_class(node) {
            self.api_count += 1;
            if python::has_docstring(node, source) {
                self.documented += 1;
            }
        } else if BRANCH_KINDS.contains(&kind) {
            self.complexity += 1;
        } else if kind == "boolean_operator" {
            // `a and b and c` nests as two binary nodes, so one per node
            // adds up to operands - 1 per chain
            self.complexity += 1;
        }
    }
}
