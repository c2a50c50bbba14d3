//! Per-strategy content extraction
//!
//! Lowers a file into a [`tree::Module`], prunes it for the chosen
//! strategy and renders it back. Extraction never fails: missing files and
//! read errors come back as inline markers so one bad file cannot abort a
//! pack.

pub mod render;
pub mod transform;
pub mod tree;

use crate::error::PackError;
use crate::models::Strategy;
use crate::parsers::python;

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use tree::Module;

/// Returned for MINIMAL when the source does not parse
pub const MINIMAL_PARSE_FAILURE: &str = "# Parsing failed.";

pub struct Extractor {
    repo_path: PathBuf,
}

impl Extractor {
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// Content of `rel` (repository-relative) reduced per `strategy`
    pub fn extract(&self, rel: &str, strategy: Strategy) -> String {
        if strategy == Strategy::Skip {
            return String::new();
        }

        let path = self.repo_path.join(rel);
        match python::read_source(&path) {
            Ok(source) => extract_source(&source, strategy, &path),
            Err(PackError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                error!("File not found during extraction: {}", rel);
                format!("[Error: File {rel} not found]")
            }
            Err(e) => {
                error!("Extraction failed for {}: {}", rel, e);
                format!("[Error extracting {rel}: {e}]")
            }
        }
    }

    /// Like [`extract`](Self::extract) for a strategy given by name.
    /// Unknown names are treated as MINIMAL.
    pub fn extract_named(&self, rel: &str, strategy: &str) -> String {
        let strategy = strategy.parse().unwrap_or_else(|_| {
            warn!("Unknown strategy '{}' for {}, using MINIMAL", strategy, rel);
            Strategy::Minimal
        });
        self.extract(rel, strategy)
    }
}

/// Apply `strategy` to in-memory source. `path` is only used in messages.
pub fn extract_source(source: &str, strategy: Strategy, path: &Path) -> String {
    match strategy {
        Strategy::Full => source.to_string(),
        Strategy::Skip => String::new(),
        Strategy::Signature => match python::parse_source(source, path) {
            Ok(tree) => {
                let module = Module::lower(&tree.root_node(), source);
                render::render_module(&transform::signature(&module))
            }
            Err(e) => {
                debug!("{}; returning source unchanged", e);
                source.to_string()
            }
        },
        Strategy::Minimal => match python::parse_source(source, path) {
            Ok(tree) => {
                let module = Module::lower(&tree.root_node(), source);
                render::render_module(&transform::minimal(&module))
            }
            Err(e) => {
                debug!("{}; returning parse failure marker", e);
                MINIMAL_PARSE_FAILURE.to_string()
            }
        },
    }
}
