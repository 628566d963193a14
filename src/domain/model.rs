use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body sent to the optimization service: the objective value
/// observed for the most recent candidate. The very first request carries
/// 0.0 and only triggers the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub value: f64,
}

/// Response body from the optimization service: the next candidate point.
/// Its length must match the problem's input dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub next: Vec<f64>,
}

/// Contextual variant of the request. The context always belongs to the
/// UPCOMING trial while the value belongs to the preceding one, so a single
/// exchange carries `[y_n, c_{n+1}]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualEvaluationRequest {
    pub value: f64,
    pub context: Vec<f64>,
}

/// A single evaluated point. For contextual sessions `x` is the joint
/// parameter/context vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: Vec<f64>,
    pub y: f64,
}

/// Per-iteration entry kept for the session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub iteration: usize,
    pub x: Vec<f64>,
    pub y: f64,
    pub y_best: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The service answered a request unsuccessfully; the loop ends with
    /// whatever best was found so far.
    ServiceClosed,
    /// The client-side trial cap (or the context schedule) was exhausted.
    TrialLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub best: Option<Observation>,
    pub trials: Vec<TrialRecord>,
    pub stop_reason: StopReason,
}

/// Serializable summary of one harness run, written as JSON through the
/// report sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub experiment: String,
    pub objective: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stop_reason: StopReason,
    pub best: Option<Observation>,
    pub trials: Vec<TrialRecord>,
}
