//! Compose two fraud checkers so that a failing primary checker is backed by a
//! secondary one.

use async_trait::async_trait;

use crate::fraud::{FraudCheck, FraudVerdict, ScoringError, TransactionCategory};

/// A [FraudCheck] that uses `primary` and falls back to `fallback` when
/// `primary` returns an error.
///
/// The fallback is asked with the same amount and category. Errors from the
/// primary checker are logged and never returned.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> WithFallback<P, F> {
    /// Create a checker that tries `primary` before `fallback`.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> FraudCheck for WithFallback<P, F>
where
    P: FraudCheck,
    F: FraudCheck,
{
    async fn check(
        &self,
        amount: f64,
        category: TransactionCategory,
    ) -> Result<FraudVerdict, ScoringError> {
        match self.primary.check(amount, category).await {
            Ok(verdict) => Ok(verdict),
            Err(error) => {
                tracing::warn!("Fraud scoring service unavailable, using local rules: {error}");
                self.fallback.check(amount, category).await
            }
        }
    }
}
