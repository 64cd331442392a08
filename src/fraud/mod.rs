//! Fraud checks for new transactions.
//!
//! A [FraudCheck] turns an amount and a [TransactionCategory] into a
//! [FraudVerdict]. There are two implementations:
//! - [ThresholdRules] applies the local, per-category threshold table.
//! - [RemoteFraudChecker] asks the external scoring service.
//!
//! [WithFallback] composes them so that the remote service is used when it
//! is reachable and the local rules are used otherwise.

mod category;
mod fallback;
mod remote;
mod rules;
mod threshold;
mod verdict;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

pub use category::TransactionCategory;
pub use fallback::WithFallback;
pub use remote::RemoteFraudChecker;
pub use rules::{ThresholdRules, evaluate};
pub use threshold::{ThresholdEntry, threshold_for};
pub use verdict::FraudVerdict;

/// Something that can decide whether a transaction looks fraudulent.
#[async_trait]
pub trait FraudCheck: Send + Sync {
    /// Evaluate a transaction of `amount` in `category`.
    ///
    /// # Errors
    /// Returns a [ScoringError] if a verdict could not be reached, e.g. the
    /// scoring service timed out.
    async fn check(
        &self,
        amount: f64,
        category: TransactionCategory,
    ) -> Result<FraudVerdict, ScoringError>;
}

/// The ways a remote fraud check can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    /// The HTTP client could not be configured.
    #[error("could not create the HTTP client: {0}")]
    Client(String),

    /// The scoring service did not answer in time.
    #[error("the scoring service timed out")]
    Timeout,

    /// The request could not be sent or the connection failed.
    #[error("could not reach the scoring service: {0}")]
    Request(String),

    /// The scoring service answered with a non-success status code.
    #[error("the scoring service responded with status {0}")]
    Status(u16),

    /// The response body was not a valid verdict.
    #[error("the scoring service sent a malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ScoringError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ScoringError::Timeout
        } else if error.is_decode() {
            ScoringError::MalformedResponse(error.to_string())
        } else {
            ScoringError::Request(error.to_string())
        }
    }
}

/// Build the fraud checker used by the application.
///
/// With an `endpoint` the remote scoring service is used, falling back to the
/// local rules on any failure. Without one only the local rules are used.
///
/// # Errors
/// Returns [ScoringError::Client] if the HTTP client could not be built.
pub fn build_fraud_checker(
    endpoint: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn FraudCheck>, ScoringError> {
    match endpoint {
        Some(endpoint) => {
            tracing::info!("Using fraud scoring service at {endpoint} with local fallback");
            let remote = RemoteFraudChecker::new(endpoint, timeout)?;
            Ok(Arc::new(WithFallback::new(remote, ThresholdRules)))
        }
        None => {
            tracing::info!("Using local fraud rules only");
            Ok(Arc::new(ThresholdRules))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::fraud::{TransactionCategory, build_fraud_checker, evaluate};

    #[tokio::test]
    async fn local_only_checker_uses_rules() {
        let checker = build_fraud_checker(None, Duration::from_secs(5)).unwrap();

        let verdict = checker
            .check(7_501.0, TransactionCategory::Transfer)
            .await
            .unwrap();

        assert_eq!(verdict, evaluate(7_501.0, TransactionCategory::Transfer));
    }
}
