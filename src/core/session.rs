use crate::domain::model::{Observation, SessionOutcome, StopReason, TrialRecord};
use crate::domain::ports::{Objective, OptimizationService, Session};
use crate::utils::error::{HarnessError, Result};
use crate::utils::format::format_vector;
use async_trait::async_trait;
use std::time::Duration;

/// The request-evaluate-respond loop against the remote service.
///
/// The first request carries value 0.0 and only triggers the service; every
/// following exchange reports the objective value for the current candidate
/// and receives the next one. The loop ends when the service answers
/// unsuccessfully or the optional client-side trial cap is reached.
pub struct OptimizationSession<S: OptimizationService, O: Objective> {
    service: S,
    objective: O,
    ready_timeout: Duration,
    max_trials: Option<usize>,
}

impl<S: OptimizationService, O: Objective> OptimizationSession<S, O> {
    pub fn new(service: S, objective: O, ready_timeout: Duration) -> Self {
        Self {
            service,
            objective,
            ready_timeout,
            max_trials: None,
        }
    }

    /// Client-side safety bound; the service normally ends the exchange by
    /// itself once its iteration budget is exhausted.
    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = Some(max_trials);
        self
    }

    fn check_dim(&self, candidate: &[f64]) -> Result<()> {
        let expected = self.objective.input_dim();
        if candidate.len() != expected {
            return Err(HarnessError::DimensionMismatch {
                expected,
                actual: candidate.len(),
            });
        }
        Ok(())
    }

    async fn next(&self, value: f64) -> Result<Vec<f64>> {
        let candidate = self.service.next_candidate(value).await?;
        self.check_dim(&candidate)?;
        Ok(candidate)
    }
}

#[async_trait]
impl<S: OptimizationService, O: Objective> Session for OptimizationSession<S, O> {
    async fn run(&mut self) -> Result<SessionOutcome> {
        self.service.wait_until_ready(self.ready_timeout).await?;

        // 第一個請求只是用來觸發服務
        let mut x_new = self.next(0.0).await?;

        let mut best: Option<Observation> = None;
        let mut y_best = f64::NEG_INFINITY;
        let mut trials = Vec::new();
        let mut iteration = 0usize;

        loop {
            iteration += 1;
            tracing::info!("[client] iteration {}", iteration);
            tracing::info!("[client] x_new = {}", format_vector(&x_new, 3));

            // Emulate the experiment by querying the objective function.
            let y_new = self.objective.evaluate(&x_new);
            if y_new > y_best {
                y_best = y_new;
                best = Some(Observation {
                    x: x_new.clone(),
                    y: y_new,
                });
            }
            tracing::info!("[client] y_new = {:.2}, y_best = {:.2}", y_new, y_best);

            trials.push(TrialRecord {
                iteration,
                x: x_new.clone(),
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

            // Report the value and ask for the next candidate. A single
            // unsuccessful exchange ends the loop.
            match self.next(y_new).await {
                Ok(candidate) => x_new = candidate,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::benchmarks::Forrester;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// In-process service fake replaying a fixed candidate script and
    /// recording every value it receives.
    #[derive(Clone)]
    struct ScriptedService {
        candidates: Arc<Mutex<VecDeque<Vec<f64>>>>,
        received: Arc<Mutex<Vec<f64>>>,
    }

    impl ScriptedService {
        fn new(script: Vec<Vec<f64>>) -> Self {
            Self {
                candidates: Arc::new(Mutex::new(script.into())),
                received: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn received_values(&self) -> Vec<f64> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OptimizationService for ScriptedService {
        async fn wait_until_ready(&self, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        async fn next_candidate(&self, value: f64) -> Result<Vec<f64>> {
            self.received.lock().unwrap().push(value);
            self.candidates
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(HarnessError::ServiceClosed { status: 410 })
        }

        async fn next_candidate_with_context(
            &self,
            value: f64,
            _context: &[f64],
        ) -> Result<Vec<f64>> {
            self.next_candidate(value).await
        }
    }

    fn session(service: &ScriptedService) -> OptimizationSession<ScriptedService, Forrester> {
        OptimizationSession::new(service.clone(), Forrester, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_first_request_is_trigger_with_zero() {
        let service = ScriptedService::new(vec![vec![0.5]]);
        let outcome = session(&service).run().await.unwrap();

        let received = service.received_values();
        assert_eq!(received[0], 0.0);
        assert_eq!(outcome.stop_reason, StopReason::ServiceClosed);
    }

    #[tokio::test]
    async fn test_best_observation_over_script() {
        let service =
            ScriptedService::new(vec![vec![0.0], vec![0.25], vec![0.5], vec![0.757]]);
        let outcome = session(&service).run().await.unwrap();

        assert_eq!(outcome.trials.len(), 4);
        let best = outcome.best.unwrap();
        assert_eq!(best.x, vec![0.757]);
        assert!((best.y - 6.020707).abs() < 1e-5);
        assert_eq!(outcome.stop_reason, StopReason::ServiceClosed);
    }

    #[tokio::test]
    async fn test_y_best_is_monotone() {
        let service =
            ScriptedService::new(vec![vec![0.0], vec![0.25], vec![0.5], vec![0.757]]);
        let outcome = session(&service).run().await.unwrap();

        let mut previous = f64::NEG_INFINITY;
        for trial in &outcome.trials {
            assert!(trial.y_best >= previous);
            assert!(trial.y_best >= trial.y);
            previous = trial.y_best;
        }
    }

    #[tokio::test]
    async fn test_reported_values_match_evaluations() {
        let service = ScriptedService::new(vec![vec![0.0], vec![0.25]]);
        let outcome = session(&service).run().await.unwrap();

        // Trigger, then one value per completed trial.
        let received = service.received_values();
        assert_eq!(received.len(), 1 + outcome.trials.len());
        for (sent, trial) in received[1..].iter().zip(&outcome.trials) {
            assert_eq!(*sent, trial.y);
        }
    }

    #[tokio::test]
    async fn test_trial_cap_stops_the_loop() {
        let service = ScriptedService::new(vec![vec![0.1]; 100]);
        let outcome = session(&service)
            .with_max_trials(3)
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.trials.len(), 3);
        assert_eq!(outcome.stop_reason, StopReason::TrialLimit);
        // Trigger plus two follow-up exchanges; the cap skips the last one.
        assert_eq!(service.received_values().len(), 3);
    }

    #[tokio::test]
    async fn test_initial_dimension_mismatch_is_an_error() {
        let service = ScriptedService::new(vec![vec![0.1, 0.2]]);
        let err = session(&service).run().await.unwrap_err();

        assert!(matches!(
            err,
            HarnessError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_mid_loop_dimension_mismatch_closes_session() {
        let service = ScriptedService::new(vec![vec![0.1], vec![0.2, 0.3]]);
        let outcome = session(&service).run().await.unwrap();

        assert_eq!(outcome.trials.len(), 1);
        assert_eq!(outcome.stop_reason, StopReason::ServiceClosed);
    }

    #[tokio::test]
    async fn test_immediate_close_has_no_observations() {
        let service = ScriptedService::new(vec![]);
        let err = session(&service).run().await.unwrap_err();

        assert!(matches!(err, HarnessError::ServiceClosed { .. }));
    }
}
