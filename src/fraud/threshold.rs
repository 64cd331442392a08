//! The static per-category risk configuration used by the local fraud rules.

use crate::fraud::TransactionCategory;

/// Risk configuration for a single transaction category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEntry {
    /// The category this entry applies to.
    pub category: TransactionCategory,
    /// Amounts above this are always suspicious.
    pub max_amount: f64,
    /// The confidence reported when an amount breaches this entry's limits.
    pub risk_level: f64,
    /// Whether amounts above 80% of `max_amount` are also suspicious.
    pub requires_extra_verification: bool,
}

impl ThresholdEntry {
    /// The amount above which a category that requires extra verification is
    /// flagged, even though it is under `max_amount`.
    pub fn extra_verification_limit(&self) -> f64 {
        self.max_amount * EXTRA_VERIFICATION_RATIO
    }
}

const EXTRA_VERIFICATION_RATIO: f64 = 0.8;

const THRESHOLDS: [ThresholdEntry; 4] = [
    ThresholdEntry {
        category: TransactionCategory::CashIn,
        max_amount: 20_000.0,
        risk_level: 0.3,
        requires_extra_verification: false,
    },
    ThresholdEntry {
        category: TransactionCategory::CashOut,
        max_amount: 5_000.0,
        risk_level: 0.6,
        requires_extra_verification: true,
    },
    ThresholdEntry {
        category: TransactionCategory::Payment,
        max_amount: 15_000.0,
        risk_level: 0.4,
        requires_extra_verification: false,
    },
    ThresholdEntry {
        category: TransactionCategory::Transfer,
        max_amount: 10_000.0,
        risk_level: 0.5,
        requires_extra_verification: true,
    },
];

/// Get the threshold entry for `category`.
pub fn threshold_for(category: TransactionCategory) -> &'static ThresholdEntry {
    match category {
        TransactionCategory::CashIn => &THRESHOLDS[0],
        TransactionCategory::CashOut => &THRESHOLDS[1],
        TransactionCategory::Payment => &THRESHOLDS[2],
        TransactionCategory::Transfer => &THRESHOLDS[3],
    }
}
