//! Checks new transactions for fraud and stores the ones that pass.

use std::sync::Mutex;

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    fraud::{FraudCheck, TransactionCategory},
    transaction::{
        FlowDirection, Transaction,
        core::{NewTransaction, create_transaction},
    },
};

/// The reason given when a checker flags a transaction without explaining why.
const DEFAULT_REJECTION_REASON: &str = "Transaction flagged as potentially fraudulent";

/// A transaction entered by a user that has not been checked or stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSubmission {
    pub amount: f64,
    pub direction: FlowDirection,
    pub category: TransactionCategory,
    pub description: String,
}

impl TransactionSubmission {
    /// Check the submission without touching the network or the database.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidAmount] if the amount is not a finite number greater than zero,
    /// - [Error::EmptyDescription] if the description is empty or only whitespace,
    /// - [Error::InvalidCategory] if the category does not go with the direction,
    ///   e.g. a cash withdrawal recorded as income.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if !self.direction.allows(self.category) {
            return Err(Error::InvalidCategory(format!(
                "{} for {}",
                self.category,
                self.direction.label().to_lowercase()
            )));
        }

        Ok(())
    }
}

/// Validate `submission`, run it through `fraud_checker` and store it for
/// `owner` if it is safe.
///
/// The database lock is only taken once the fraud check has finished, and
/// nothing is written unless every step succeeds.
///
/// # Errors
/// Returns:
/// - any error from [TransactionSubmission::validate],
/// - [Error::FraudCheckUnavailable] if `fraud_checker` could not reach a verdict,
/// - [Error::FraudRejected] with the checker's reason if the transaction was flagged,
/// - [Error::DatabaseLockError] or [Error::SqlError] if the transaction could not be stored.
pub async fn submit_transaction(
    submission: TransactionSubmission,
    owner: UserID,
    fraud_checker: &dyn FraudCheck,
    db_connection: &Mutex<Connection>,
) -> Result<Transaction, Error> {
    submission.validate()?;

    let verdict = fraud_checker
        .check(submission.amount, submission.category)
        .await
        .map_err(|error| Error::FraudCheckUnavailable(error.to_string()))?;
    let checked_at = OffsetDateTime::now_utc();

    if verdict.fraudulent {
        let reason = verdict
            .reason
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_owned());

        tracing::warn!(
            user_id = %owner,
            amount = submission.amount,
            category = %submission.category,
            confidence = verdict.confidence,
            "Rejected transaction: {reason}"
        );

        return Err(Error::FraudRejected(reason));
    }

    let connection = db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    create_transaction(
        NewTransaction {
            owner,
            amount: submission.amount,
            direction: submission.direction,
            category: submission.category,
            description: submission.description.trim().to_owned(),
            checked_at,
        },
        &connection,
    )
}
