use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Service request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Service answered with status {status}")]
    ServiceClosed { status: u16 },

    #[error("Service at {endpoint} did not become ready within {timeout_seconds}s")]
    ServiceUnavailable {
        endpoint: String,
        timeout_seconds: u64,
    },

    #[error("Candidate dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unknown objective function: {name}")]
    UnknownObjective { name: String },

    #[error("Reference check failed: {message}")]
    ReferenceMismatch { message: String },

    #[error("Session finished without a single observation")]
    EmptySession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Protocol,
    Verification,
    Io,
}

impl HarnessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ServiceClosed { .. } | Self::ServiceUnavailable { .. } => {
                ErrorCategory::Network
            }
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::UnknownObjective { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::DimensionMismatch { .. } => ErrorCategory::Protocol,
            Self::ReferenceMismatch { .. } | Self::EmptySession => ErrorCategory::Verification,
            Self::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(_) | Self::ServiceClosed { .. } | Self::ServiceUnavailable { .. } => {
                ErrorSeverity::Medium
            }
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::UnknownObjective { .. }
            | Self::SerializationError(_)
            | Self::DimensionMismatch { .. }
            | Self::ReferenceMismatch { .. }
            | Self::EmptySession => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => "Check that the service URL is reachable from this host".into(),
            Self::ServiceClosed { .. } => {
                "The service refused the exchange; check its logs and restart the experiment".into()
            }
            Self::ServiceUnavailable { .. } => {
                "Start the optimization service or increase --ready-timeout-seconds".into()
            }
            Self::DimensionMismatch { .. } => {
                "Make sure --input-dim matches the dimensionality the service was configured with"
                    .into()
            }
            Self::SerializationError(_) => {
                "The service response is not the expected JSON shape; check its version".into()
            }
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => {
                "Fix the configuration value and run again".into()
            }
            Self::UnknownObjective { .. } => {
                "Use one of the built-in objectives (forrester, sphere)".into()
            }
            Self::ReferenceMismatch { .. } => {
                "The service converged somewhere else; inspect the session report".into()
            }
            Self::EmptySession => {
                "The service closed before a single candidate was evaluated; check its max_iter"
                    .into()
            }
            Self::IoError(_) => "Check permissions on the report output path".into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::ServiceUnavailable { .. } => {
                format!("Could not reach the optimization service: {}", self)
            }
            Self::ServiceClosed { status } => {
                format!("The optimization service ended the exchange (status {})", status)
            }
            Self::ReferenceMismatch { message } => {
                format!("Discovered optimum does not match the reference: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
