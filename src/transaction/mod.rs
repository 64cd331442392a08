//! Transactions and the submission flow that guards them.
//!
//! This module contains:
//! - The `Transaction` model and the database functions for storing and
//!   querying transactions
//! - [submit_transaction], which runs new transactions through the fraud check
//!   before storing them
//! - The route handlers used by the add transaction form

mod category_options;
mod core;
mod create_endpoint;
mod fraud_check_endpoint;
mod submit;

pub use category_options::{category_options, get_category_options};
pub use core::{
    FlowDirection, FraudCheckOutcome, FraudCheckStatus, Transaction, TransactionId,
    create_transaction_table, get_transactions_for_user,
};
pub use create_endpoint::create_transaction_endpoint;
pub use fraud_check_endpoint::{fraud_check_endpoint, fraud_check_preview};
pub use submit::{TransactionSubmission, submit_transaction};

#[cfg(test)]
pub use core::{NewTransaction, count_transactions, create_transaction};
