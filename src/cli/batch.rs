//! Batch command - pack every repository of a workspace

use anyhow::Result;

use super::pack::pack_repo;
use super::Cli;
use crate::pipeline::batch::BatchRunner;

pub fn run(cli: &Cli) -> Result<()> {
    let summary = BatchRunner::new(&cli.path).run_all(|repo| pack_repo(cli, repo).map(|_| ()));

    for (name, message) in &summary.failed {
        println!("Failed: {}: {}", name, message);
    }
    println!(
        "Batch run complete: {}/{} succeeded in {:.2}s",
        summary.succeeded.len(),
        summary.total,
        summary.elapsed_ms as f64 / 1000.0
    );
    Ok(())
}
