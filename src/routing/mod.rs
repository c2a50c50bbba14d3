//! Adaptive routing: metrics in, extraction strategy out
//!
//! The decision matrix is an ordered list of [`Rule`]s; the first rule
//! whose predicate holds picks the strategy. The path-marker override runs
//! after the cascade on every file and cannot be bypassed by reordering
//! the rules.

use crate::config::RoutingThresholds;
use crate::context::RunContext;
use crate::models::{ComplexityRecord, DependencyRecord, RoutingDecision, Strategy};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub const REASON_CORE: &str = "Core infrastructure (high centrality)";
pub const REASON_CORE_DOCUMENTED: &str = "Core but complex, well documented (contract suffices)";
pub const REASON_CORE_COMPLEX: &str = "Core and complex (needs implementation for context)";
pub const REASON_COMPLEX: &str = "High complexity/richness (API focus)";
pub const REASON_SMALL_UTILITY: &str = "Small utility (cheap to include verbatim)";
pub const REASON_DEFAULT: &str = "Default utility";
pub const REASON_SKIP: &str = "Test/mock file";

/// Both metric records of one file, with missing records defaulted
#[derive(Debug, Clone, Copy)]
pub struct RoutingInput<'a> {
    pub path: &'a str,
    pub dependency: &'a DependencyRecord,
    pub complexity: &'a ComplexityRecord,
}

impl RoutingInput<'_> {
    fn is_core(&self, t: &RoutingThresholds) -> bool {
        self.dependency.centrality() >= t.high_centrality_threshold
            || self.dependency.in_degree >= t.high_in_degree
    }

    fn is_complex(&self, t: &RoutingThresholds) -> bool {
        self.complexity.cyclomatic_complexity >= t.high_complexity_threshold
    }
}

/// One row of the decision matrix
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RoutingInput, &RoutingThresholds) -> bool,
    pub strategy: Strategy,
    pub reason: &'static str,
}

/// The cascade, in evaluation order. The last rule always matches.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "core",
            applies: |i, t| i.is_core(t) && !i.is_complex(t),
            strategy: Strategy::Full,
            reason: REASON_CORE,
        },
        Rule {
            name: "core-documented",
            applies: |i, t| {
                i.is_core(t) && i.complexity.documentation_coverage > t.documented_coverage
            },
            strategy: Strategy::Signature,
            reason: REASON_CORE_DOCUMENTED,
        },
        Rule {
            name: "core-complex",
            applies: |i, t| i.is_core(t),
            strategy: Strategy::Full,
            reason: REASON_CORE_COMPLEX,
        },
        Rule {
            name: "complex-or-rich",
            applies: |i, t| {
                i.is_complex(t) || i.complexity.context_richness_score >= t.richness_threshold
            },
            strategy: Strategy::Signature,
            reason: REASON_COMPLEX,
        },
        Rule {
            name: "small-utility",
            applies: |i, t| i.complexity.context_richness_score < t.small_utility_richness_ceiling,
            strategy: Strategy::Full,
            reason: REASON_SMALL_UTILITY,
        },
        Rule {
            name: "default",
            applies: |_, _| true,
            strategy: Strategy::Minimal,
            reason: REASON_DEFAULT,
        },
    ]
}

pub struct RoutingEngine {
    thresholds: RoutingThresholds,
    rules: Vec<Rule>,
}

impl RoutingEngine {
    pub fn new(thresholds: RoutingThresholds) -> Self {
        Self {
            thresholds,
            rules: default_rules(),
        }
    }

    /// Decide a strategy for every file present in either map and return
    /// the decisions in packing order.
    pub fn route_all(
        &self,
        ctx: &RunContext,
        dependencies: &BTreeMap<String, DependencyRecord>,
        complexity: &BTreeMap<String, ComplexityRecord>,
    ) -> Vec<RoutingDecision> {
        let _span = ctx.phase("routing").entered();

        let all_files: BTreeSet<&String> = dependencies.keys().chain(complexity.keys()).collect();
        info!("Routing extraction strategies for {} files", all_files.len());

        let missing_dep = DependencyRecord::default();
        let missing_comp = ComplexityRecord::default();

        let mut decisions: Vec<RoutingDecision> = all_files
            .into_iter()
            .map(|path| {
                let input = RoutingInput {
                    path,
                    dependency: dependencies.get(path).unwrap_or(&missing_dep),
                    complexity: complexity.get(path).unwrap_or(&missing_comp),
                };
                self.decide(&input)
            })
            .collect();

        sort_for_packing(&mut decisions);
        info!("Routing complete");
        decisions
    }

    /// Run the cascade, then the override, for one file
    pub fn decide(&self, input: &RoutingInput) -> RoutingDecision {
        let (strategy, reason) = self
            .rules
            .iter()
            .find(|rule| (rule.applies)(input, &self.thresholds))
            .map(|rule| {
                debug!("{} matched rule '{}'", input.path, rule.name);
                (rule.strategy, rule.reason)
            })
            .unwrap_or((Strategy::Minimal, REASON_DEFAULT));

        let (strategy, reason) = self.apply_override(input.path, strategy, reason);

        RoutingDecision::new(
            input.path.to_string(),
            input.dependency.clone(),
            input.complexity.clone(),
            strategy,
            reason,
        )
    }

    /// Test and mock files are always skipped, whatever the cascade chose
    fn apply_override(
        &self,
        path: &str,
        strategy: Strategy,
        reason: &'static str,
    ) -> (Strategy, &'static str) {
        let lower = path.to_lowercase();
        let marked = self
            .thresholds
            .skip_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()));
        if marked {
            (Strategy::Skip, REASON_SKIP)
        } else {
            (strategy, reason)
        }
    }
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(RoutingThresholds::default())
    }
}

/// Priority rank descending, then centrality descending. The sort is
/// stable, so remaining ties keep input (path) order.
pub fn sort_for_packing(decisions: &mut [RoutingDecision]) {
    decisions.sort_by(|a, b| {
        b.priority_rank
            .cmp(&a.priority_rank)
            .then_with(|| b.centrality().total_cmp(&a.centrality()))
    });
}
