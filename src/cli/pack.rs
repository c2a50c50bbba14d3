//! Default command - pack one repository and write its artifacts

use anyhow::Result;
use std::path::Path;

use super::Cli;
use crate::config::load_project_config;
use crate::pipeline::{PackOutcome, Pipeline};
use crate::reporters::write_artifacts;

pub fn run(cli: &Cli) -> Result<()> {
    let outcome = pack_repo(cli, &cli.path)?;
    print_summary(&outcome);
    Ok(())
}

/// Load the repository's config, apply flags, run and write artifacts
pub(super) fn pack_repo(cli: &Cli, repo_path: &Path) -> Result<PackOutcome> {
    let mut config = load_project_config(repo_path);
    cli.apply_overrides(&mut config);

    let outcome = Pipeline::new(config.clone()).run(repo_path)?;

    let output_dir = config.output_dir(repo_path);
    write_artifacts(&outcome, &output_dir, config.output.write_reports)?;
    Ok(outcome)
}

fn print_summary(outcome: &PackOutcome) {
    let doc = &outcome.document;
    println!("Packed {}", outcome.repo_name);
    println!(
        "  files: {} analyzed, {} packed, {} left out",
        outcome.files_analyzed,
        doc.included.len(),
        doc.omitted.len()
    );
    println!("  size:  {} / {}", doc.total_size, doc.budget);
    if outcome.parse_failures > 0 {
        println!("  parse failures: {}", outcome.parse_failures);
    }
    println!("  time:  {}ms", outcome.elapsed_ms);
}
