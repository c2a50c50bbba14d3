//! Core data models for contextpack
//!
//! These are plain value records handed from one pipeline phase to the
//! next. Dependencies are referenced by repository-relative path strings,
//! never by handles into another record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Per-file structural metrics produced by the dependency graph builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Number of distinct files importing this one
    pub in_degree: usize,
    /// Number of distinct internal files this one imports
    pub out_degree: usize,
    /// Internal files this one imports (never contains its own path)
    pub dependencies: BTreeSet<String>,
    /// Whether the file carries a top-level `if __name__ == "__main__":` guard
    pub is_entry_point: bool,
}

impl DependencyRecord {
    /// In-degree minus out-degree. Positive means the file is depended on
    /// more than it depends on others.
    pub fn centrality(&self) -> f64 {
        self.in_degree as f64 - self.out_degree as f64
    }
}

/// Per-file complexity and documentation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityRecord {
    /// Non-blank lines that are not pure `#` comments
    pub loc: usize,
    /// Function and class definitions at any nesting depth
    pub api_count: usize,
    /// McCabe-style complexity, always >= 1 for a parsed file
    pub cyclomatic_complexity: u32,
    /// Percentage of API entities with a docstring (100 when there are none)
    pub documentation_coverage: f64,
    /// `min(100, api_count * 5 + loc / 50)`
    pub context_richness_score: f64,
}

impl Default for ComplexityRecord {
    /// All-zero metrics, used for files the analyzer never produced a record for.
    fn default() -> Self {
        Self {
            loc: 0,
            api_count: 0,
            cyclomatic_complexity: 0,
            documentation_coverage: 0.0,
            context_richness_score: 0.0,
        }
    }
}

/// How much of a file's content ends up in the pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    /// Verbatim source
    Full,
    /// Signatures and docstrings, bodies replaced by `...`
    Signature,
    /// Docstrings and definition skeleton only
    Minimal,
    /// Nothing
    Skip,
}

impl Strategy {
    /// Packing priority: FULL=4, SIGNATURE=3, MINIMAL=2, SKIP=1
    pub fn priority_rank(self) -> u8 {
        match self {
            Strategy::Full => 4,
            Strategy::Signature => 3,
            Strategy::Minimal => 2,
            Strategy::Skip => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Full => "FULL",
            Strategy::Signature => "SIGNATURE",
            Strategy::Minimal => "MINIMAL",
            Strategy::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FULL" => Ok(Strategy::Full),
            "SIGNATURE" => Ok(Strategy::Signature),
            "MINIMAL" => Ok(Strategy::Minimal),
            "SKIP" => Ok(Strategy::Skip),
            _ => Err(anyhow::anyhow!(
                "Unknown strategy '{}'. Valid strategies: FULL, SIGNATURE, MINIMAL, SKIP",
                s
            )),
        }
    }
}

/// The routing engine's verdict for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub file_path: String,
    pub dependency: DependencyRecord,
    pub complexity: ComplexityRecord,
    pub strategy: Strategy,
    pub reason: &'static str,
    pub priority_rank: u8,
}

impl RoutingDecision {
    pub fn new(
        file_path: String,
        dependency: DependencyRecord,
        complexity: ComplexityRecord,
        strategy: Strategy,
        reason: &'static str,
    ) -> Self {
        Self {
            file_path,
            dependency,
            complexity,
            strategy,
            reason,
            priority_rank: strategy.priority_rank(),
        }
    }

    pub fn centrality(&self) -> f64 {
        self.dependency.centrality()
    }
}

/// Round to two decimal places, the precision used for percentage metrics
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
