//! Best-effort mapping of Python import statements to repository files
//!
//! A dotted module resolves to `<path>.py` first, then to the package init
//! `<path>/__init__.py`. Anything that does not exist under the repository
//! root is external.

use crate::parsers::python::ImportStatement;
use std::path::Path;

const PACKAGE_INIT: &str = "__init__.py";

/// Outcome of resolving all imports of one file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedImports {
    /// Repository-relative paths of imported files
    pub internal: Vec<String>,
    /// Root package names of imports that are not part of the repository
    pub external: Vec<String>,
}

pub struct ModuleResolver<'a> {
    root: &'a Path,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Resolve every import of `importer` (a repository-relative path)
    pub fn resolve_all(&self, importer: &str, imports: &[ImportStatement]) -> ResolvedImports {
        let mut resolved = ResolvedImports::default();

        for import in imports {
            match import {
                ImportStatement::Module { module } => {
                    self.resolve_absolute_into(&[module.clone()], &mut resolved);
                }
                ImportStatement::From {
                    level: 0,
                    module,
                    names,
                } => {
                    if names.is_empty() {
                        self.resolve_absolute_into(&[module.clone()], &mut resolved);
                    }
                    for name in names {
                        // `from core import config` may name a submodule or
                        // just a member of `core`
                        let candidates = [format!("{module}.{name}"), module.clone()];
                        self.resolve_absolute_into(&candidates, &mut resolved);
                    }
                }
                ImportStatement::From {
                    level,
                    module,
                    names,
                } => {
                    let Some(base) = ascend(importer, *level) else {
                        continue;
                    };
                    let mut candidate_sets: Vec<Vec<String>> = names
                        .iter()
                        .map(|name| {
                            if module.is_empty() {
                                vec![name.clone(), String::new()]
                            } else {
                                vec![format!("{module}.{name}"), module.clone()]
                            }
                        })
                        .collect();
                    if names.is_empty() {
                        candidate_sets.push(vec![module.clone()]);
                    }
                    for candidates in candidate_sets {
                        if let Some(target) = candidates.iter().find_map(|c| self.lookup(&base, c)) {
                            resolved.internal.push(target);
                        }
                    }
                }
            }
        }

        resolved
    }

    /// Resolve a dotted module path from the repository root
    pub fn resolve_absolute(&self, module: &str) -> Option<String> {
        if module.is_empty() {
            return None;
        }
        self.lookup(&[], module)
    }

    fn resolve_absolute_into(&self, candidates: &[String], resolved: &mut ResolvedImports) {
        match candidates.iter().find_map(|c| self.resolve_absolute(c)) {
            Some(target) => resolved.internal.push(target),
            None => {
                if let Some(root) = candidates
                    .first()
                    .and_then(|c| c.split('.').next())
                    .filter(|r| !r.is_empty())
                {
                    resolved.external.push(root.to_string());
                }
            }
        }
    }

    /// Two-shape test under `base`: `<path>.py`, then `<path>/__init__.py`.
    /// An empty module names the package init of `base` itself.
    fn lookup(&self, base: &[String], module: &str) -> Option<String> {
        let mut parts: Vec<&str> = base.iter().map(String::as_str).collect();
        parts.extend(module.split('.').filter(|p| !p.is_empty()));

        if !module.is_empty() {
            let as_file = format!("{}.py", parts.join("/"));
            if self.root.join(&as_file).is_file() {
                return Some(as_file);
            }
        }

        let as_package = if parts.is_empty() {
            PACKAGE_INIT.to_string()
        } else {
            format!("{}/{}", parts.join("/"), PACKAGE_INIT)
        };
        self.root
            .join(&as_package)
            .is_file()
            .then_some(as_package)
    }
}

/// Directory components reached by a relative import of `level` dots.
///
/// Level 1 is the importer's own directory; each extra dot goes one level
/// up. Returns `None` when that would leave the repository.
pub fn ascend(importer: &str, level: usize) -> Option<Vec<String>> {
    let mut dir: Vec<String> = importer.split('/').map(str::to_string).collect();
    dir.pop();
    for _ in 1..level {
        dir.pop()?;
    }
    Some(dir)
}
