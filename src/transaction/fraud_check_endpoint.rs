//! Lets the add transaction form ask for a fraud verdict before submitting.
//!
//! Nothing is stored, the verdict is only returned to the caller. API clients
//! get JSON from [fraud_check_endpoint], the form gets a status line from
//! [fraud_check_preview].

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    fraud::{FraudCheck, FraudVerdict, TransactionCategory},
};

/// The state needed to run a fraud check.
#[derive(Clone)]
pub struct FraudCheckState {
    pub fraud_checker: Arc<dyn FraudCheck>,
}

impl FromRef<AppState> for FraudCheckState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            fraud_checker: state.fraud_checker.clone(),
        }
    }
}

/// The request body, same shape as the scoring service's.
#[derive(Debug, Deserialize)]
pub struct FraudCheckRequest {
    pub amount: f64,
    pub transaction_type: String,
}

fn json_error(status: StatusCode, error: &Error) -> Response {
    json_message(status, &error.to_string())
}

fn json_message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// A route handler that returns the fraud verdict for an amount and category as JSON.
pub async fn fraud_check_endpoint(
    State(state): State<FraudCheckState>,
    request: Result<Json<FraudCheckRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected fraud check request: {rejection}");
            return json_message(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    if !request.amount.is_finite() || request.amount <= 0.0 {
        return json_error(StatusCode::BAD_REQUEST, &Error::InvalidAmount(request.amount));
    }

    let category: TransactionCategory = match request.transaction_type.parse() {
        Ok(category) => category,
        Err(error) => return json_error(StatusCode::BAD_REQUEST, &error),
    };

    match state.fraud_checker.check(request.amount, category).await {
        Ok(verdict) => Json(verdict).into_response(),
        Err(error) => {
            tracing::error!(
                "Could not check {category} transaction of {}: {error}",
                request.amount
            );
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                &Error::FraudCheckUnavailable(error.to_string()),
            )
        }
    }
}

/// The add transaction form fields the preview needs, the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct FraudPreviewForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
}

fn verdict_status(verdict: &FraudVerdict) -> Markup {
    if verdict.fraudulent {
        html! {
            p class="text-sm text-red-600 dark:text-red-400"
            {
                "This transaction may be flagged as fraudulent"
                @if let Some(reason) = &verdict.reason {
                    ": " (reason)
                }
            }
        }
    } else {
        html! {
            p class="text-sm text-green-600 dark:text-green-400"
            {
                "Transaction verified as safe"
            }
        }
    }
}

/// A route handler that renders the fraud status line for the add transaction form.
///
/// Renders nothing until the form has a positive amount and a known category.
/// The submission is checked again when the form is posted.
pub async fn fraud_check_preview(
    State(state): State<FraudCheckState>,
    Form(form): Form<FraudPreviewForm>,
) -> Markup {
    let Ok(amount) = form.amount.trim().parse::<f64>() else {
        return html! {};
    };
    if !amount.is_finite() || amount <= 0.0 {
        return html! {};
    }
    let Ok(category) = form.category.parse::<TransactionCategory>() else {
        return html! {};
    };

    match state.fraud_checker.check(amount, category).await {
        Ok(verdict) => verdict_status(&verdict),
        Err(error) => {
            tracing::warn!("Could not preview {category} transaction of {amount}: {error}");
            html! {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Could not verify transaction safety"
                }
            }
        }
    }
}
