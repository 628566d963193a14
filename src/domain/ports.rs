use crate::domain::model::SessionOutcome;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The remote optimization service boundary: one scalar in, one candidate
/// vector out. The engine behind it (surrogate model, acquisition function,
/// convergence detection) is not ours.
#[async_trait]
pub trait OptimizationService: Send + Sync {
    /// Blocks until the service answers or the timeout elapses.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<()>;

    /// Reports the latest objective value and receives the next candidate.
    async fn next_candidate(&self, value: f64) -> Result<Vec<f64>>;

    /// Contextual exchange: the context accompanies the preceding value.
    async fn next_candidate_with_context(&self, value: f64, context: &[f64]) -> Result<Vec<f64>>;
}

/// A black-box objective function, maximization convention.
pub trait Objective: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn input_dim(&self) -> usize;
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl Objective for Box<dyn Objective> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn input_dim(&self) -> usize {
        self.as_ref().input_dim()
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        self.as_ref().evaluate(x)
    }
}

/// Supplies the context vector for the upcoming trial.
pub trait ContextSource: Send + Sync {
    fn context_dim(&self) -> usize;

    /// Next context, or `None` when the schedule is exhausted.
    fn next_context(&mut self) -> Option<Vec<f64>>;
}

impl ContextSource for Box<dyn ContextSource> {
    fn context_dim(&self) -> usize {
        self.as_ref().context_dim()
    }

    fn next_context(&mut self) -> Option<Vec<f64>> {
        self.as_mut().next_context()
    }
}

pub trait ReportSink: Send + Sync {
    fn write_report(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Implemented by both session flavors so the harness can drive either.
#[async_trait]
pub trait Session: Send + Sync {
    async fn run(&mut self) -> Result<SessionOutcome>;
}
