//! The result of a fraud check.

use serde::{Deserialize, Serialize};

/// The outcome of evaluating a transaction for fraud.
///
/// This is also the response body of the remote scoring service. The aliases
/// accept the field names used by older versions of that service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudVerdict {
    /// Whether the transaction should be rejected.
    #[serde(alias = "is_fraudulent")]
    pub fraudulent: bool,
    /// How sure the checker is of the verdict, in [0, 1].
    #[serde(alias = "fraud_probability")]
    pub confidence: f64,
    /// A human readable explanation, usually only set for fraudulent verdicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FraudVerdict {
    /// A verdict that lets the transaction through.
    pub fn safe(confidence: f64) -> Self {
        Self {
            fraudulent: false,
            confidence,
            reason: None,
        }
    }

    /// A verdict that rejects the transaction with `reason`.
    pub fn fraudulent(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            fraudulent: true,
            confidence,
            reason: Some(reason.into()),
        }
    }

    /// Whether the confidence is a number in [0, 1].
    pub fn has_valid_confidence(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }
}
