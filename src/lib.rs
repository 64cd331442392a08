//! SafeLedger is a web app for tracking personal transactions.
//!
//! Every new transaction goes through a fraud check before it is stored.
//! The check asks an external scoring service and falls back to local
//! per-category rules when the service cannot be reached.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
pub mod fraud;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use transaction::{
    FlowDirection, FraudCheckOutcome, FraudCheckStatus, Transaction, TransactionId,
    TransactionSubmission, get_transactions_for_user, submit_transaction,
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The text entered as an email address is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An empty string was used as the user's name.
    #[error("name cannot be empty")]
    EmptyName,

    /// A transaction amount that is zero, negative or not a number.
    ///
    /// Transactions record how much money moved, the direction is recorded
    /// separately, so amounts must be strictly positive.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// The submitted amount could not be read as a number.
    #[error("\"{0}\" is not a valid amount, enter a number such as 12.50")]
    UnparsableAmount(String),

    /// An empty string was used as a transaction description.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// The text does not name one of the known transaction categories.
    #[error("\"{0}\" is not a valid transaction category")]
    InvalidCategory(String),

    /// The text does not name a flow direction, i.e. income or expense.
    #[error("\"{0}\" is not a valid transaction direction")]
    InvalidDirection(String),

    /// The fraud check flagged the transaction, so it was not saved.
    ///
    /// The string is the reason given by the fraud check.
    #[error("transaction flagged as potentially fraudulent: {0}")]
    FraudRejected(String),

    /// No fraud verdict could be reached for the transaction.
    ///
    /// This only happens when the configured fraud checker has no fallback.
    #[error("the fraud check could not be completed: {0}")]
    FraudCheckUnavailable(String),

    /// Either the auth cookie is missing from the cookie jar in the request,
    /// or it could not be read.
    #[error("no valid auth cookie in the cookie jar")]
    CookieMissing,

    /// There was an error creating or formatting the auth cookie expiry.
    #[error("could not set the auth cookie: {0}")]
    CookieError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for forms submitted with HTMX.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidAmount(_)
            | Error::UnparsableAmount(_)
            | Error::EmptyDescription
            | Error::InvalidCategory(_)
            | Error::InvalidDirection(_) => (
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid transaction", &self.to_string()),
            )
                .into_response(),
            Error::FraudRejected(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error(
                    "This transaction has been flagged as potentially fraudulent",
                    &reason,
                ),
            )
                .into_response(),
            Error::FraudCheckUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Alert::error(
                    "Could not verify transaction",
                    "The fraud check could not be completed. Try again later.",
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}
