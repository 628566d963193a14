pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalReportStore, toml_config::ExperimentConfig, CliConfig, RunSettings};
pub use core::{
    client::HttpOptimizationService,
    contextual::{ContextSchedule, ContextualOptimizationSession, FixedContext},
    harness::{Harness, ReferenceCheck},
    session::OptimizationSession,
};
pub use utils::error::{HarnessError, Result};
