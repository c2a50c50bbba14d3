//! contextpack - condense a Python repository into a budgeted context pack
//!
//! The pipeline builds an internal import graph and per-file metrics,
//! routes every file to an extraction strategy (FULL, SIGNATURE, MINIMAL,
//! SKIP), and packs the extracted files into one document that stays under
//! a size budget. See [`pipeline::Pipeline`] for the entry point.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod files;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod pack;
pub mod parsers;
pub mod pipeline;
pub mod reporters;
pub mod routing;

pub use config::PackConfig;
pub use error::{PackError, PackResult};
pub use models::{ComplexityRecord, DependencyRecord, RoutingDecision, Strategy};
pub use pipeline::{PackOutcome, Pipeline};
