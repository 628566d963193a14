use crate::domain::model::{Observation, SessionOutcome, StopReason, TrialRecord};
use crate::domain::ports::{ContextSource, Objective, OptimizationService, Session};
use crate::utils::error::{HarnessError, Result};
use crate::utils::format::format_vector;
use async_trait::async_trait;
use std::time::Duration;

/// Context-aware variant of the optimization loop.
///
/// Each exchange carries the objective value of the preceding trial together
/// with the context under which the NEXT candidate will be evaluated, so a
/// single request holds `[y_n, c_{n+1}]`. The objective is evaluated on the
/// joint parameter/context vector and the best observation records both.
pub struct ContextualOptimizationSession<S, O, C>
where
    S: OptimizationService,
    O: Objective,
    C: ContextSource,
{
    service: S,
    objective: O,
    contexts: C,
    ready_timeout: Duration,
    max_trials: Option<usize>,
}

impl<S, O, C> ContextualOptimizationSession<S, O, C>
where
    S: OptimizationService,
    O: Objective,
    C: ContextSource,
{
    pub fn new(service: S, objective: O, contexts: C, ready_timeout: Duration) -> Result<Self> {
        if contexts.context_dim() >= objective.input_dim() {
            return Err(HarnessError::InvalidConfigValueError {
                field: "problem.context".to_string(),
                value: contexts.context_dim().to_string(),
                reason: format!(
                    "Context dimension must be smaller than the objective's input dimension ({})",
                    objective.input_dim()
                ),
            });
        }
        Ok(Self {
            service,
            objective,
            contexts,
            ready_timeout,
            max_trials: None,
        })
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = Some(max_trials);
        self
    }

    /// Dimensionality of the optimization variables alone.
    fn parameter_dim(&self) -> usize {
        self.objective.input_dim() - self.contexts.context_dim()
    }

    fn check_dim(&self, candidate: &[f64]) -> Result<()> {
        let expected = self.parameter_dim();
        if candidate.len() != expected {
            return Err(HarnessError::DimensionMismatch {
                expected,
                actual: candidate.len(),
            });
        }
        Ok(())
    }

    async fn next(&self, value: f64, context: &[f64]) -> Result<Vec<f64>> {
        let candidate = self
            .service
            .next_candidate_with_context(value, context)
            .await?;
        self.check_dim(&candidate)?;
        Ok(candidate)
    }
}

#[async_trait]
impl<S, O, C> Session for ContextualOptimizationSession<S, O, C>
where
    S: OptimizationService,
    O: Objective,
    C: ContextSource,
{
    async fn run(&mut self) -> Result<SessionOutcome> {
        self.service.wait_until_ready(self.ready_timeout).await?;

        // 觸發請求帶著初始 context
        let mut context = self
            .contexts
            .next_context()
            .ok_or(HarnessError::MissingConfigError {
                field: "problem.context".to_string(),
            })?;
        let mut x_new = self.next(0.0, &context).await?;

        let mut best: Option<Observation> = None;
        let mut y_best = f64::NEG_INFINITY;
        let mut trials = Vec::new();
        let mut iteration = 0usize;

        loop {
            iteration += 1;
            tracing::info!("[client] iteration {}", iteration);
            tracing::info!(
                "[client] x_new = {}, context = {}",
                format_vector(&x_new, 3),
                format_vector(&context, 3)
            );

            // Evaluate on the joint parameter/context vector.
            let mut joint = x_new.clone();
            joint.extend_from_slice(&context);
            let y_new = self.objective.evaluate(&joint);
            if y_new > y_best {
                y_best = y_new;
                best = Some(Observation {
                    x: joint.clone(),
                    y: y_new,
                });
            }
            tracing::info!("[client] y_new = {:.2}, y_best = {:.2}", y_new, y_best);

            trials.push(TrialRecord {
                iteration,
                x: joint,
                y: y_new,
                y_best,
            });

            if let Some(cap) = self.max_trials {
                if iteration >= cap {
                    tracing::info!("[client] trial cap of {} reached, stopping", cap);
                    return Ok(SessionOutcome {
                        best,
                        trials,
                        stop_reason: StopReason::TrialLimit,
                    });
                }
            }

            // The schedule running out ends the session cleanly.
            let Some(next_context) = self.contexts.next_context() else {
                tracing::info!("[client] context schedule exhausted, stopping");
                return Ok(SessionOutcome {
                    best,
                    trials,
                    stop_reason: StopReason::TrialLimit,
                });
            };

            match self.next(y_new, &next_context).await {
                Ok(candidate) => {
                    x_new = candidate;
                    context = next_context;
                }
                Err(e) => {
                    tracing::warn!("[client] invalid response, stopping: {}", e);
                    return Ok(SessionOutcome {
                        best,
                        trials,
                        stop_reason: StopReason::ServiceClosed,
                    });
                }
            }
        }
    }
}

/// The same context for every trial.
pub struct FixedContext {
    context: Vec<f64>,
}

impl FixedContext {
    pub fn new(context: Vec<f64>) -> Self {
        Self { context }
    }
}

impl ContextSource for FixedContext {
    fn context_dim(&self) -> usize {
        self.context.len()
    }

    fn next_context(&mut self) -> Option<Vec<f64>> {
        Some(self.context.clone())
    }
}

/// A finite list of contexts, one per trial.
pub struct ContextSchedule {
    dim: usize,
    contexts: std::vec::IntoIter<Vec<f64>>,
}

impl ContextSchedule {
    pub fn new(contexts: Vec<Vec<f64>>) -> Result<Self> {
        let dim = contexts
            .first()
            .map(|c| c.len())
            .ok_or(HarnessError::MissingConfigError {
                field: "problem.contexts".to_string(),
            })?;
        if contexts.iter().any(|c| c.len() != dim) {
            return Err(HarnessError::InvalidConfigValueError {
                field: "problem.contexts".to_string(),
                value: format!("{} entries", contexts.len()),
                reason: "All context vectors must have the same length".to_string(),
            });
        }
        Ok(Self {
            dim,
            contexts: contexts.into_iter(),
        })
    }
}

impl ContextSource for ContextSchedule {
    fn context_dim(&self) -> usize {
        self.dim
    }

    fn next_context(&mut self) -> Option<Vec<f64>> {
        self.contexts.next()
    }
}
