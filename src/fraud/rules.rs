//! Local fraud rules based on the per-category threshold table.

use async_trait::async_trait;

use crate::fraud::{FraudCheck, FraudVerdict, ScoringError, TransactionCategory, threshold_for};

/// The confidence reported for transactions that pass every rule.
const SAFE_CONFIDENCE: f64 = 0.95;

const LARGE_CASH_WITHDRAWAL: f64 = 3_000.0;
const LARGE_CASH_WITHDRAWAL_CONFIDENCE: f64 = 0.75;
const LARGE_TRANSFER: f64 = 7_500.0;
const LARGE_TRANSFER_CONFIDENCE: f64 = 0.8;

/// Decide whether a transaction of `amount` in `category` looks fraudulent.
///
/// Rules are applied in order and the first match wins:
/// 1. The amount is over the category's maximum, or the category requires
///    extra verification and the amount is over 80% of the maximum.
/// 2. Cash withdrawals over 3000.
/// 3. Transfers over 7500.
///
/// Anything else is safe. The result only depends on the arguments.
pub fn evaluate(amount: f64, category: TransactionCategory) -> FraudVerdict {
    let threshold = threshold_for(category);

    let is_suspicious = amount > threshold.max_amount
        || (threshold.requires_extra_verification
            && amount > threshold.extra_verification_limit());

    if is_suspicious {
        return FraudVerdict::fraudulent(
            threshold.risk_level,
            format!(
                "Suspicious {} transaction: Amount {amount} exceeds normal limits",
                category.as_str().to_lowercase()
            ),
        );
    }

    match category {
        TransactionCategory::CashOut if amount > LARGE_CASH_WITHDRAWAL => {
            FraudVerdict::fraudulent(
                LARGE_CASH_WITHDRAWAL_CONFIDENCE,
                "Large cash withdrawal requires additional verification",
            )
        }
        TransactionCategory::Transfer if amount > LARGE_TRANSFER => FraudVerdict::fraudulent(
            LARGE_TRANSFER_CONFIDENCE,
            "Large transfer amount requires compliance review",
        ),
        _ => FraudVerdict::safe(SAFE_CONFIDENCE),
    }
}

/// A [FraudCheck] that only uses the local rules, see [evaluate].
///
/// This checker never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdRules;

#[async_trait]
impl FraudCheck for ThresholdRules {
    async fn check(
        &self,
        amount: f64,
        category: TransactionCategory,
    ) -> Result<FraudVerdict, ScoringError> {
        Ok(evaluate(amount, category))
    }
}
