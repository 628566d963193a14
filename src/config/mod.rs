pub mod cli;
pub mod toml_config;

use crate::core::harness::ReferenceCheck;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "bayesopt-harness")]
#[command(about = "Client harness for a remote Bayesian optimization service")]
pub struct CliConfig {
    #[arg(long, default_value = "http://127.0.0.1:8080/bayesopt")]
    pub service_url: String,

    #[arg(long, default_value = "forrester")]
    pub objective: String,

    #[arg(long, default_value = "1")]
    pub input_dim: usize,

    /// Fixed context vector; turns the run into a contextual session.
    #[arg(long, value_delimiter = ',')]
    pub context: Vec<f64>,

    #[arg(long)]
    pub max_trials: Option<usize>,

    #[arg(long, default_value = "60")]
    pub ready_timeout_seconds: u64,

    #[arg(long, default_value = "10")]
    pub request_timeout_seconds: u64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "TOML experiment file overriding the flags above")]
    pub experiment_file: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        // 實驗檔案另行驗證
        if self.experiment_file.is_some() {
            return Ok(());
        }

        validate_url("service_url", &self.service_url)?;
        validate_non_empty_string("objective", &self.objective)?;
        validate_positive_number("input_dim", self.input_dim, 1)?;
        validate_positive_number(
            "ready_timeout_seconds",
            self.ready_timeout_seconds as usize,
            1,
        )?;
        validate_positive_number(
            "request_timeout_seconds",
            self.request_timeout_seconds as usize,
            1,
        )?;
        validate_path("output_path", &self.output_path)?;
        if let Some(max_trials) = self.max_trials {
            validate_positive_number("max_trials", max_trials, 1)?;
        }
        Ok(())
    }
}

/// How contexts are supplied for a contextual session.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextSpec {
    Fixed(Vec<f64>),
    Schedule(Vec<Vec<f64>>),
}

/// Fully resolved run parameters, either straight from the CLI flags or
/// loaded from a TOML experiment file.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub experiment: String,
    pub service_url: String,
    pub objective: String,
    pub input_dim: usize,
    pub context: Option<ContextSpec>,
    pub max_trials: Option<usize>,
    pub ready_timeout: Duration,
    pub request_timeout: Duration,
    pub output_path: String,
    pub reference: Option<ReferenceCheck>,
}

impl RunSettings {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        if let Some(path) = &cli.experiment_file {
            let config = toml_config::ExperimentConfig::from_file(path)?;
            config.validate_config()?;
            return Ok(config.into_run_settings());
        }

        Ok(Self {
            experiment: cli.objective.clone(),
            service_url: cli.service_url.clone(),
            objective: cli.objective.clone(),
            input_dim: cli.input_dim,
            context: if cli.context.is_empty() {
                None
            } else {
                Some(ContextSpec::Fixed(cli.context.clone()))
            },
            max_trials: cli.max_trials,
            ready_timeout: Duration::from_secs(cli.ready_timeout_seconds),
            request_timeout: Duration::from_secs(cli.request_timeout_seconds),
            output_path: cli.output_path.clone(),
            reference: None,
        })
    }
}
