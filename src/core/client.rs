use crate::domain::model::{CandidateResponse, ContextualEvaluationRequest, EvaluationRequest};
use crate::domain::ports::OptimizationService;
use crate::utils::error::{HarnessError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// HTTP client for the remote optimization service. One endpoint, JSON
/// bodies, strictly sequential exchanges.
pub struct HttpOptimizationService {
    endpoint: String,
    client: Client,
}

impl HttpOptimizationService {
    pub fn new(endpoint: String, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { endpoint, client })
    }

    async fn exchange<B: Serialize + Sync>(&self, body: &B) -> Result<Vec<f64>> {
        tracing::debug!("Posting evaluation to: {}", self.endpoint);
        let response = self.client.post(&self.endpoint).json(body).send().await?;

        tracing::debug!("Service response status: {}", response.status());
        if !response.status().is_success() {
            return Err(HarnessError::ServiceClosed {
                status: response.status().as_u16(),
            });
        }

        let reply: CandidateResponse = response.json().await?;
        Ok(reply.next)
    }
}

#[async_trait]
impl OptimizationService for HttpOptimizationService {
    async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            // 任何 HTTP 回應都表示服務已存在
            match self.client.get(&self.endpoint).send().await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::debug!("Service not ready yet: {}", e);
                }
            }

            if tokio::time::Instant::now() + READY_POLL_INTERVAL > deadline {
                return Err(HarnessError::ServiceUnavailable {
                    endpoint: self.endpoint.clone(),
                    timeout_seconds: timeout.as_secs(),
                });
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn next_candidate(&self, value: f64) -> Result<Vec<f64>> {
        self.exchange(&EvaluationRequest { value }).await
    }

    async fn next_candidate_with_context(&self, value: f64, context: &[f64]) -> Result<Vec<f64>> {
        self.exchange(&ContextualEvaluationRequest {
            value,
            context: context.to_vec(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn service(url: String) -> HttpOptimizationService {
        HttpOptimizationService::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_next_candidate_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/bayesopt");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"next": [0.25, 0.75]}));
        });

        let svc = service(server.url("/bayesopt"));
        let next = svc.next_candidate(1.5).await.unwrap();

        mock.assert();
        assert_eq!(next, vec![0.25, 0.75]);
    }

    #[tokio::test]
    async fn test_next_candidate_sends_value() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/bayesopt")
                .json_body(serde_json::json!({"value": 2.5}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"next": [0.1]}));
        });

        let svc = service(server.url("/bayesopt"));
        svc.next_candidate(2.5).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_contextual_request_carries_context() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/bayesopt")
                .json_body(serde_json::json!({"value": 0.0, "context": [1.0, 2.0]}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"next": [0.5]}));
        });

        let svc = service(server.url("/bayesopt"));
        let next = svc
            .next_candidate_with_context(0.0, &[1.0, 2.0])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(next, vec![0.5]);
    }

    #[tokio::test]
    async fn test_unsuccessful_status_is_service_closed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bayesopt");
            then.status(500);
        });

        let svc = service(server.url("/bayesopt"));
        let err = svc.next_candidate(0.0).await.unwrap_err();

        assert!(matches!(err, HarnessError::ServiceClosed { status: 500 }));
    }

    #[tokio::test]
    async fn test_malformed_response_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bayesopt");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("not json");
        });

        let svc = service(server.url("/bayesopt"));
        let err = svc.next_candidate(0.0).await.unwrap_err();

        assert!(matches!(err, HarnessError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_wait_until_ready_succeeds_when_service_exists() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bayesopt");
            then.status(405);
        });

        let svc = service(server.url("/bayesopt"));
        svc.wait_until_ready(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        // Nothing listens on this port.
        let svc = HttpOptimizationService::new(
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = svc.wait_until_ready(Duration::from_millis(300)).await;
        assert!(matches!(
            err,
            Err(HarnessError::ServiceUnavailable { .. })
        ));
    }
}
