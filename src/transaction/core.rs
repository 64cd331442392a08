//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, fraud::TransactionCategory};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a transaction.
pub type TransactionId = i64;

/// Whether money came into or went out of the user's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl FlowDirection {
    /// The form value of the direction, e.g. "income".
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::Income => "income",
            FlowDirection::Expense => "expense",
        }
    }

    /// A human friendly name for the direction.
    pub fn label(&self) -> &'static str {
        match self {
            FlowDirection::Income => "Income",
            FlowDirection::Expense => "Expense",
        }
    }

    /// The categories a user may pick for this direction.
    ///
    /// Cash can only be deposited as income and withdrawn as an expense,
    /// payments and transfers can go either way.
    pub fn categories(&self) -> &'static [TransactionCategory] {
        match self {
            FlowDirection::Income => &[
                TransactionCategory::CashIn,
                TransactionCategory::Payment,
                TransactionCategory::Transfer,
            ],
            FlowDirection::Expense => &[
                TransactionCategory::CashOut,
                TransactionCategory::Payment,
                TransactionCategory::Transfer,
            ],
        }
    }

    /// Whether `category` is one of [FlowDirection::categories].
    pub fn allows(&self, category: TransactionCategory) -> bool {
        self.categories().contains(&category)
    }
}

impl Display for FlowDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(FlowDirection::Income),
            "expense" => Ok(FlowDirection::Expense),
            other => Err(Error::InvalidDirection(other.to_owned())),
        }
    }
}

impl ToSql for FlowDirection {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FlowDirection {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The result of the fraud check recorded with a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudCheckStatus {
    /// The transaction passed the fraud check.
    Safe,
    /// The transaction was flagged. These are never stored.
    Fraudulent,
}

impl FraudCheckStatus {
    fn as_str(&self) -> &'static str {
        match self {
            FraudCheckStatus::Safe => "safe",
            FraudCheckStatus::Fraudulent => "fraudulent",
        }
    }
}

impl ToSql for FraudCheckStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FraudCheckStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "safe" => Ok(FraudCheckStatus::Safe),
            "fraudulent" => Ok(FraudCheckStatus::Fraudulent),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// When a transaction was checked for fraud, and the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudCheckOutcome {
    /// The verdict.
    pub status: FraudCheckStatus,
    /// When the verdict was reached.
    pub checked_at: OffsetDateTime,
}

/// Money that moved into or out of a user's account.
///
/// Stored transactions have always passed the fraud check, so
/// `fraud_check.status` is always [FraudCheckStatus::Safe].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that submitted the transaction.
    pub owner: UserID,
    /// How much money moved. Always greater than zero, see `direction` for the sign.
    pub amount: f64,
    /// Whether the money came in or went out.
    pub direction: FlowDirection,
    /// What kind of transaction it was, as used by the fraud check.
    pub category: TransactionCategory,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction was stored.
    pub created_at: OffsetDateTime,
    /// The fraud check the transaction passed.
    pub fraud_check: FraudCheckOutcome,
}

impl Transaction {
    /// The amount with income as positive and expenses as negative.
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            FlowDirection::Income => self.amount,
            FlowDirection::Expense => -self.amount,
        }
    }
}

/// A transaction that passed the fraud check and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub owner: UserID,
    pub amount: f64,
    pub direction: FlowDirection,
    pub category: TransactionCategory,
    pub description: String,
    /// When the fraud check returned a safe verdict.
    pub checked_at: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a transaction that passed the fraud check.
///
/// The ID and creation time are assigned here.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `owner` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (owner_id, amount, direction, category, description, created_at,
                 fraud_status, fraud_checked_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, owner_id, amount, direction, category, description, created_at,
                fraud_status, fraud_checked_at",
        )?
        .query_row(
            (
                new_transaction.owner.as_i64(),
                new_transaction.amount,
                new_transaction.direction,
                new_transaction.category,
                &new_transaction.description,
                OffsetDateTime::now_utc(),
                FraudCheckStatus::Safe,
                new_transaction.checked_at,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Get the transactions submitted by `owner`, newest first.
///
/// Transactions created at the same instant are ordered by ID, highest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, direction, category, description, created_at,
                fraud_status, fraud_checked_at
             FROM \"transaction\"
             WHERE owner_id = :owner_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// The table only accepts transactions with a positive amount and a safe
/// fraud check status.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                direction TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                fraud_status TEXT NOT NULL CHECK (fraud_status = 'safe'),
                fraud_checked_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Index for listing a user's transactions, newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_created
            ON \"transaction\"(owner_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        owner: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        direction: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        fraud_check: FraudCheckOutcome {
            status: row.get(7)?,
            checked_at: row.get(8)?,
        },
    })
}

// ============================================================================
// TESTS
// ============================================================================
