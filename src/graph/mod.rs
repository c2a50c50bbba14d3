//! Internal module dependency graph
//!
//! Parses every file, resolves its imports against the repository and
//! records file-to-file edges in a petgraph `DiGraph`. Once all files are
//! in, the graph is reduced to one [`DependencyRecord`] per file and
//! discarded.

pub mod resolve;

use crate::context::RunContext;
use crate::models::DependencyRecord;
use crate::parsers::python;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rayon::prelude::*;
use resolve::ModuleResolver;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Finished output of the graph builder
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// One record per analyzed file and per file that is an import target
    pub records: BTreeMap<String, DependencyRecord>,
    /// Root names of imports that are not part of the repository
    pub external_imports: BTreeSet<String>,
    /// Files carrying a main guard
    pub entry_points: BTreeSet<String>,
    /// Files that could not be read or parsed
    pub parse_failures: usize,
}

/// What one file contributes to the graph
#[derive(Debug)]
struct FileScan {
    path: String,
    is_entry_point: bool,
    internal: Vec<String>,
    external: Vec<String>,
}

pub struct DependencyGraphBuilder {
    repo_path: PathBuf,
    graph: DiGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
    analyzed: BTreeSet<String>,
    entry_points: BTreeSet<String>,
    external_imports: BTreeSet<String>,
}

impl DependencyGraphBuilder {
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            analyzed: BTreeSet::new(),
            entry_points: BTreeSet::new(),
            external_imports: BTreeSet::new(),
        }
    }

    /// Build the graph over `files` (repository-relative, `/`-separated).
    ///
    /// Files are scanned in parallel; edges are merged in input order.
    pub fn build(mut self, ctx: &RunContext, files: &[String]) -> DependencyGraph {
        let _span = ctx.phase("dependency_graph").entered();
        info!("Starting dependency analysis of {} files", files.len());

        let repo_path = self.repo_path.clone();
        let scans: Vec<Option<FileScan>> = files
            .par_iter()
            .map(|rel| match scan_file(&repo_path, rel) {
                Ok(scan) => Some(scan),
                Err(e) => {
                    warn!(trace_id = %ctx.trace_id(), "Skipping {}: {}", rel, e);
                    None
                }
            })
            .collect();

        let parse_failures = scans.iter().filter(|s| s.is_none()).count();
        for scan in scans.into_iter().flatten() {
            self.merge(scan);
        }

        let graph = self.finish(parse_failures);
        info!(
            "Dependency graph complete: {} files, {} external packages, {} parse failures",
            graph.records.len(),
            graph.external_imports.len(),
            graph.parse_failures
        );
        graph
    }

    fn merge(&mut self, scan: FileScan) {
        self.node(&scan.path);
        if scan.is_entry_point {
            self.entry_points.insert(scan.path.clone());
        }
        for target in &scan.internal {
            self.add_edge(&scan.path, target);
        }
        self.external_imports.extend(scan.external);
        self.analyzed.insert(scan.path);
    }

    fn node(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.node_index.insert(path.to_string(), idx);
        idx
    }

    /// Record that `source` depends on `target`. Self-edges are ignored and
    /// repeated imports collapse into one edge.
    fn add_edge(&mut self, source: &str, target: &str) {
        if source == target {
            return;
        }
        let from = self.node(source);
        let to = self.node(target);
        self.graph.update_edge(from, to, ());
    }

    fn finish(self, parse_failures: usize) -> DependencyGraph {
        let mut records = BTreeMap::new();

        for idx in self.graph.node_indices() {
            let path = &self.graph[idx];
            let in_degree = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .count();
            if in_degree == 0 && !self.analyzed.contains(path) {
                continue;
            }
            let dependencies: BTreeSet<String> = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| self.graph[n].clone())
                .collect();

            records.insert(
                path.clone(),
                DependencyRecord {
                    in_degree,
                    out_degree: dependencies.len(),
                    dependencies,
                    is_entry_point: self.entry_points.contains(path),
                },
            );
        }

        DependencyGraph {
            records,
            external_imports: self.external_imports,
            entry_points: self.entry_points,
            parse_failures,
        }
    }
}

fn scan_file(repo_path: &Path, rel: &str) -> Result<FileScan, crate::error::PackError> {
    let (source, tree) = python::parse_file(&repo_path.join(rel))?;
    let root = tree.root_node();

    let imports = python::extract_imports(&root, &source);
    let resolved = ModuleResolver::new(repo_path).resolve_all(rel, &imports);

    Ok(FileScan {
        path: rel.to_string(),
        is_entry_point: python::has_main_guard(&root, &source),
        internal: resolved.internal,
        external: resolved.external,
    })
}
