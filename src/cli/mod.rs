//! CLI command definitions and handlers

mod batch;
mod init;
mod pack;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PackConfig;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// contextpack - condense a Python repository into a budgeted context pack
#[derive(Parser, Debug)]
#[command(name = "contextpack")]
#[command(
    version,
    about = "Condense a Python repository into a budget-constrained context pack",
    long_about = "contextpack builds an import graph and per-file metrics for a Python \
repository, decides for every file whether to include it in full, as signatures, \
as docstrings only, or not at all, and packs the result into one Markdown document \
that stays under a size budget.\n\n\
Run without a subcommand to pack the current directory:\n  \
contextpack .",
    after_help = "\
Examples:
  contextpack .                           Pack current directory
  contextpack /path/to/repo --budget 8000 Pack with an 8000-token budget
  contextpack . --oracle chars            Measure the budget in characters
  contextpack . -o out --no-reports       Write only out/scaffold.md
  contextpack batch ~/workspace           Pack every repo in ~/workspace/repos
  contextpack init                        Write a contextpack.toml with defaults"
)]
pub struct Cli {
    /// Path to repository, or workspace root for `batch` (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    /// Size budget for the packed document (overrides contextpack.toml)
    #[arg(long, short = 'b', global = true)]
    pub budget: Option<usize>,

    /// How the budget is measured: tokens, chars, words
    #[arg(long, global = true, value_parser = ["tokens", "chars", "words"])]
    pub oracle: Option<String>,

    /// Output directory, relative to the repository (default: the repository itself)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// Only write scaffold.md
    #[arg(long, global = true)]
    pub no_reports: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a contextpack.toml with the default settings
    Init,

    /// Pack every repository under <PATH>/repos
    Batch,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, config: &mut PackConfig) {
        if let Some(budget) = self.budget {
            config.budget.total = budget;
        }
        if let Some(oracle) = &self.oracle {
            config.budget.oracle = oracle.clone();
        }
        if let Some(output) = &self.output {
            config.output.directory = Some(output.clone());
        }
        if self.no_reports {
            config.output.write_reports = false;
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.workers)
        .build()?;

    match cli.command {
        Some(Commands::Init) => init::run(&cli.path),
        Some(Commands::Batch) => pool.install(|| batch::run(&cli)),
        None => pool.install(|| pack::run(&cli)),
    }
}
