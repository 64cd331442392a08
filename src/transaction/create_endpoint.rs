//! Defines the endpoint for submitting a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    fraud::FraudCheck,
    transaction::{TransactionSubmission, submit_transaction},
};

/// The state needed to check and store a transaction.
#[derive(Clone)]
pub struct SubmitTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub fraud_checker: Arc<dyn FraudCheck>,
}

impl FromRef<AppState> for SubmitTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            fraud_checker: state.fraud_checker.clone(),
        }
    }
}

/// The form data for submitting a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in dollars, as typed by the user.
    pub amount: String,
    /// "income" or "expense".
    pub direction: String,
    /// A category wire name, e.g. "CASH_OUT".
    pub category: String,
    /// Text detailing the transaction.
    pub description: String,
}

impl TryFrom<TransactionForm> for TransactionSubmission {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        let amount = form
            .amount
            .trim()
            .parse()
            .map_err(|_| Error::UnparsableAmount(form.amount.clone()))?;

        Ok(Self {
            amount,
            direction: form.direction.parse()?,
            category: form.category.parse()?,
            description: form.description,
        })
    }
}

/// A route handler for submitting a new transaction, redirects to the dashboard on success.
///
/// Errors and fraud rejections are returned as alerts.
pub async fn create_transaction_endpoint(
    State(state): State<SubmitTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let submission = match TransactionSubmission::try_from(form) {
        Ok(submission) => submission,
        Err(error) => return error.into_alert_response(),
    };

    match submit_transaction(
        submission,
        user_id,
        state.fraud_checker.as_ref(),
        &state.db_connection,
    )
    .await
    {
        Ok(transaction) => {
            tracing::info!(
                user_id = %user_id,
                transaction_id = transaction.id,
                "Stored transaction"
            );

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
