//! A client for the external fraud scoring service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::fraud::{FraudCheck, FraudVerdict, ScoringError, TransactionCategory};

/// The request body expected by the scoring service.
#[derive(Debug, Serialize)]
struct ScoringRequest {
    amount: f64,
    transaction_type: TransactionCategory,
}

/// A [FraudCheck] that asks a remote scoring service for a verdict.
///
/// Each check is a single `POST` request with a bounded wait. Failures are
/// returned as errors and not retried, wrap this checker with
/// [crate::fraud::WithFallback] to fall back to local rules.
#[derive(Debug, Clone)]
pub struct RemoteFraudChecker {
    http: reqwest::Client,
    endpoint: String,
}

impl RemoteFraudChecker {
    /// How long to wait for the scoring service before giving up.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a client that posts to `endpoint`, e.g.
    /// "http://127.0.0.1:5000/fraud-detection".
    ///
    /// # Errors
    /// Returns [ScoringError::Client] if the HTTP client could not be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ScoringError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ScoringError::Client(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_owned(),
        })
    }
}

#[async_trait]
impl FraudCheck for RemoteFraudChecker {
    async fn check(
        &self,
        amount: f64,
        category: TransactionCategory,
    ) -> Result<FraudVerdict, ScoringError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ScoringRequest {
                amount,
                transaction_type: category,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Status(status.as_u16()));
        }

        let verdict: FraudVerdict = response.json().await?;

        if !verdict.has_valid_confidence() {
            return Err(ScoringError::MalformedResponse(format!(
                "confidence {} is outside [0, 1]",
                verdict.confidence
            )));
        }

        tracing::debug!(
            "Scoring service returned {verdict:?} for {category} transaction of {amount}"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `router` on a random local port and return the URL of its
    /// scoring endpoint.
    pub(crate) async fn spawn_scoring_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind test scoring server");
        let address = listener.local_addr().expect("Could not get local address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test scoring server stopped unexpectedly");
        });

        format!("http://{address}/fraud-detection")
    }
}
