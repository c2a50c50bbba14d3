//! Markdown summary reports
//!
//! - `blueprint.md` - the most central and the most complex files
//! - `architecture.md` - run statistics and strategy breakdown

use crate::models::Strategy;
use crate::pipeline::PackOutcome;
use chrono::Local;

/// Entries listed per blueprint section
const TOP_N: usize = 5;

pub fn render_blueprint(outcome: &PackOutcome) -> String {
    let mut md = format!("# Domain Blueprint: {}\n\n", outcome.repo_name);

    let mut central: Vec<(&String, f64)> = outcome
        .dependencies
        .iter()
        .map(|(path, record)| (path, record.centrality()))
        .collect();
    central.sort_by(|a, b| b.1.total_cmp(&a.1));

    md.push_str("## 1. Core Entities (High Centrality)\n");
    md.push_str("These modules are the structural foundation of the codebase.\n");
    for (path, centrality) in central.iter().take(TOP_N) {
        md.push_str(&format!("* **{}** (Centrality: {:.1})\n", path, centrality));
    }

    let mut complex: Vec<(&String, u32)> = outcome
        .complexity
        .iter()
        .map(|(path, record)| (path, record.cyclomatic_complexity))
        .collect();
    complex.sort_by(|a, b| b.1.cmp(&a.1));

    md.push_str("\n## 2. Complexity Hotspots (High Difficulty)\n");
    md.push_str("These modules contain the densest logic.\n");
    for (path, complexity) in complex.iter().take(TOP_N) {
        md.push_str(&format!(
            "* **{}** (Cyclomatic Complexity: {})\n",
            path, complexity
        ));
    }

    md
}

pub fn render_architecture(outcome: &PackOutcome) -> String {
    let doc = &outcome.document;
    let count = |strategy: Strategy| {
        outcome
            .decisions
            .iter()
            .filter(|d| d.strategy == strategy)
            .count()
    };

    let mut md = format!(
        r#"# Architecture Overview: {}

Generated: {}

## Analysis Stats
* **Total Files Analyzed:** {}
* **Total Size Used:** {}
* **Budget:** {}
* **Files Packed:** {}
* **Files Omitted (budget):** {}
* **External Packages:** {}

## Strategy Breakdown
"#,
        outcome.repo_name,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        outcome.dependencies.len(),
        doc.total_size,
        doc.budget,
        doc.included.len(),
        doc.omitted.len(),
        outcome.external_imports.len(),
    );

    for strategy in [
        Strategy::Full,
        Strategy::Signature,
        Strategy::Minimal,
        Strategy::Skip,
    ] {
        md.push_str(&format!("* **{}:** {}\n", strategy, count(strategy)));
    }

    if !outcome.entry_points.is_empty() {
        md.push_str("\n## Entry Points\n");
        for path in &outcome.entry_points {
            md.push_str(&format!("* `{}`\n", path));
        }
    }

    md.push_str(
        r#"
## Context Strategy
This scaffold was generated using an **Architecture-First** approach.
* **Core Modules** were extracted fully.
* **Complex Logic** was summarized via signatures.
* **Utilities** were minimized.
"#,
    );

    md
}
