use crate::domain::model::{Observation, SessionOutcome, SessionReport};
use crate::domain::ports::{ReportSink, Session};
use crate::utils::error::{HarnessError, Result};
use crate::utils::format::format_vector;
use chrono::Utc;

/// Known reference values for an experiment, asserted against the discovered
/// optimum with EXPECT_NEAR semantics: absolute difference within the
/// tolerance, element-wise for the argmax.
#[derive(Debug, Clone)]
pub struct ReferenceCheck {
    pub expected_optimum: f64,
    pub expected_argmax: Vec<f64>,
    pub tolerance: f64,
}

impl ReferenceCheck {
    pub fn verify(&self, best: &Observation) -> Result<()> {
        if (best.y - self.expected_optimum).abs() > self.tolerance {
            return Err(HarnessError::ReferenceMismatch {
                message: format!(
                    "y_best = {:.4}, expected {:.4} (tolerance {})",
                    best.y, self.expected_optimum, self.tolerance
                ),
            });
        }

        if best.x.len() != self.expected_argmax.len() {
            return Err(HarnessError::ReferenceMismatch {
                message: format!(
                    "x_best has {} dimensions, expected {}",
                    best.x.len(),
                    self.expected_argmax.len()
                ),
            });
        }

        for (i, (got, expected)) in best.x.iter().zip(&self.expected_argmax).enumerate() {
            if (got - expected).abs() > self.tolerance {
                return Err(HarnessError::ReferenceMismatch {
                    message: format!(
                        "x_best[{}] = {:.4}, expected {:.4} (tolerance {})",
                        i, got, expected, self.tolerance
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Drives a session to completion, persists the JSON report and runs the
/// optional reference check against the discovered optimum.
pub struct Harness<S: Session, R: ReportSink> {
    session: S,
    report_store: R,
    experiment: String,
    objective: String,
    reference: Option<ReferenceCheck>,
}

impl<S: Session, R: ReportSink> Harness<S, R> {
    pub fn new(session: S, report_store: R, experiment: String, objective: String) -> Self {
        Self {
            session,
            report_store,
            experiment,
            objective,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: ReferenceCheck) -> Self {
        self.reference = Some(reference);
        self
    }

    pub async fn run(&mut self) -> Result<SessionOutcome> {
        tracing::info!("Starting optimization session '{}'", self.experiment);
        let started_at = Utc::now();

        let outcome = self.session.run().await?;

        let finished_at = Utc::now();
        match &outcome.best {
            Some(best) => tracing::info!(
                "Session finished after {} trials: y_best = {:.4} at x_best = {}",
                outcome.trials.len(),
                best.y,
                format_vector(&best.x, 3)
            ),
            None => tracing::warn!("Session finished without observations"),
        }

        let report = SessionReport {
            experiment: self.experiment.clone(),
            objective: self.objective.clone(),
            started_at,
            finished_at,
            stop_reason: outcome.stop_reason,
            best: outcome.best.clone(),
            trials: outcome.trials.clone(),
        };
        let report_name = format!("{}_report.json", self.experiment);
        let data = serde_json::to_vec_pretty(&report)?;
        self.report_store.write_report(&report_name, &data).await?;
        tracing::debug!("Report written as {}", report_name);

        if let Some(reference) = &self.reference {
            let best = outcome.best.as_ref().ok_or(HarnessError::EmptySession)?;
            reference.verify(best)?;
            tracing::info!("Reference check passed");
        }

        Ok(outcome)
    }
}
