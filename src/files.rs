//! Source file discovery
//!
//! Walks the repository respecting `.gitignore` and `.packignore`, then
//! applies the directory denylist and test-file name patterns from
//! `[exclude]`. Paths come back repository-relative with `/` separators.

use crate::config::ExcludeConfig;
use crate::error::{PackError, PackResult};

use anyhow::Result;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Extensions the pipeline knows how to analyze
pub const SUPPORTED_EXTENSIONS: &[&str] = &["py"];

/// Custom ignore file honoured in addition to `.gitignore`
pub const IGNORE_FILE_NAME: &str = ".packignore";

/// Decides which paths under the repository are analyzed
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    dirs: HashSet<String>,
    skip_test_files: bool,
}

impl IgnorePolicy {
    pub fn new(exclude: &ExcludeConfig) -> Self {
        Self {
            dirs: exclude.dirs.iter().cloned().collect(),
            skip_test_files: exclude.skip_test_files,
        }
    }

    /// Whether a repository-relative path should be analyzed
    pub fn accepts(&self, rel_path: &Path) -> bool {
        let ext_ok = rel_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if !ext_ok {
            return false;
        }

        let in_ignored_dir = rel_path.components().any(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .map(|p| self.dirs.contains(p))
                .unwrap_or(false),
            _ => false,
        });
        if in_ignored_dir {
            return false;
        }

        if self.skip_test_files {
            let name = rel_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if name.starts_with("test_") || name.ends_with("_test.py") {
                return false;
            }
        }

        true
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::new(&ExcludeConfig::default())
    }
}

/// Check that the repository root exists and is a directory.
///
/// This is the only fatal I/O condition of a run.
pub fn validate_repo_root(repo_path: &Path) -> PackResult<()> {
    if !repo_path.exists() {
        return Err(PackError::RepoNotFound(repo_path.to_path_buf()));
    }
    if !repo_path.is_dir() {
        return Err(PackError::NotADirectory(repo_path.to_path_buf()));
    }
    Ok(())
}

/// Collect all analyzable files in the repository, sorted by path
pub fn collect_source_files(repo_path: &Path, policy: &IgnorePolicy) -> Result<Vec<String>> {
    validate_repo_root(repo_path)?;

    let mut builder = WalkBuilder::new(repo_path);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME);

    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(repo_path) else {
            continue;
        };
        if policy.accepts(rel) {
            files.push(to_slash(rel));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Render a relative path with `/` separators, the key format used in
/// every per-file map.
pub fn to_slash(rel_path: &Path) -> String {
    rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
