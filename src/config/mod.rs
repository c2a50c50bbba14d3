//! Configuration module for contextpack
//!
//! This module handles:
//! - Project-level configuration (contextpack.toml)
//! - Routing threshold overrides
//! - Budget and size-oracle selection
//! - File exclusion and output location

mod project_config;

pub use project_config::{
    BudgetConfig,
    ExcludeConfig,
    OutputConfig,
    PackConfig,
    RoutingThresholds,
    CONFIG_FILE_NAME,
    load_project_config,
};
