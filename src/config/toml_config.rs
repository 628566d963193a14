use crate::config::{ContextSpec, RunSettings};
use crate::core::harness::ReferenceCheck;
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_float, validate_positive_number,
    validate_url,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_READY_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentSection,
    pub service: ServiceSection,
    pub problem: ProblemSection,
    pub limits: Option<LimitsSection>,
    pub reference: Option<ReferenceSection>,
    pub report: Option<ReportSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    pub endpoint: String,
    pub ready_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSection {
    pub objective: String,
    /// Joint dimensionality: parameters plus context when one is used.
    pub input_dim: usize,
    pub fixed_context: Option<Vec<f64>>,
    pub contexts: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSection {
    pub max_trials: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSection {
    pub expected_optimum: f64,
    pub expected_argmax: Vec<f64>,
    pub tolerance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub output_path: String,
}

impl ExperimentConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarnessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HarnessError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SERVICE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern");

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("experiment.name", &self.experiment.name)?;
        validate_url("service.endpoint", &self.service.endpoint)?;
        validate_non_empty_string("problem.objective", &self.problem.objective)?;
        validate_positive_number("problem.input_dim", self.problem.input_dim, 1)?;

        if self.problem.fixed_context.is_some() && self.problem.contexts.is_some() {
            return Err(HarnessError::ConfigValidationError {
                field: "problem".to_string(),
                message: "fixed_context and contexts are mutually exclusive".to_string(),
            });
        }

        if let Some(limits) = &self.limits {
            if let Some(max_trials) = limits.max_trials {
                validate_positive_number("limits.max_trials", max_trials, 1)?;
            }
        }

        if let Some(reference) = &self.reference {
            if let Some(tolerance) = reference.tolerance {
                validate_positive_float("reference.tolerance", tolerance)?;
            }
            if reference.expected_argmax.len() != self.problem.input_dim {
                return Err(HarnessError::ConfigValidationError {
                    field: "reference.expected_argmax".to_string(),
                    message: format!(
                        "Expected {} dimensions to match problem.input_dim, got {}",
                        self.problem.input_dim,
                        reference.expected_argmax.len()
                    ),
                });
            }
        }

        if let Some(report) = &self.report {
            validate_path("report.output_path", &report.output_path)?;
        }

        Ok(())
    }

    pub fn into_run_settings(self) -> RunSettings {
        let context = match (self.problem.fixed_context, self.problem.contexts) {
            (Some(fixed), _) => Some(ContextSpec::Fixed(fixed)),
            (None, Some(schedule)) => Some(ContextSpec::Schedule(schedule)),
            (None, None) => None,
        };

        RunSettings {
            experiment: self.experiment.name,
            service_url: self.service.endpoint,
            objective: self.problem.objective,
            input_dim: self.problem.input_dim,
            context,
            max_trials: self.limits.and_then(|l| l.max_trials),
            ready_timeout: Duration::from_secs(
                self.service
                    .ready_timeout_seconds
                    .unwrap_or(DEFAULT_READY_TIMEOUT_SECONDS),
            ),
            request_timeout: Duration::from_secs(
                self.service
                    .request_timeout_seconds
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            ),
            output_path: self
                .report
                .map(|r| r.output_path)
                .unwrap_or_else(|| "./output".to_string()),
            reference: self.reference.map(|r| ReferenceCheck {
                expected_optimum: r.expected_optimum,
                expected_argmax: r.expected_argmax,
                tolerance: r.tolerance.unwrap_or(DEFAULT_TOLERANCE),
            }),
        }
    }
}
