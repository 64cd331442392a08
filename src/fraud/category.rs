//! The channel through which money moved in a transaction.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Classifies a transaction's channel.
///
/// Each category has an entry in the fraud threshold table, see
/// [crate::fraud::threshold_for].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    /// Cash deposited into the account.
    CashIn,
    /// Cash withdrawn from the account.
    CashOut,
    /// A payment to or from a merchant.
    Payment,
    /// A transfer between accounts.
    Transfer,
}

impl TransactionCategory {
    /// All categories in display order.
    pub const ALL: [TransactionCategory; 4] = [
        TransactionCategory::CashIn,
        TransactionCategory::CashOut,
        TransactionCategory::Payment,
        TransactionCategory::Transfer,
    ];

    /// The wire name of the category, e.g. "CASH_IN".
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::CashIn => "CASH_IN",
            TransactionCategory::CashOut => "CASH_OUT",
            TransactionCategory::Payment => "PAYMENT",
            TransactionCategory::Transfer => "TRANSFER",
        }
    }

    /// A human friendly name for the category.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionCategory::CashIn => "Cash Deposit",
            TransactionCategory::CashOut => "Cash Withdrawal",
            TransactionCategory::Payment => "Payment",
            TransactionCategory::Transfer => "Transfer",
        }
    }
}

impl Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionCategory {
    type Err = Error;

    /// Parse a wire name such as "TRANSFER".
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] for anything other than the four
    /// known category names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl ToSql for TransactionCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, fraud::TransactionCategory};

    #[test]
    fn parses_known_categories() {
        for category in TransactionCategory::ALL {
            assert_eq!(category.as_str().parse(), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let result = "WIRE".parse::<TransactionCategory>();

        assert_eq!(result, Err(Error::InvalidCategory("WIRE".to_owned())));
    }

    #[test]
    fn rejects_lowercase_category() {
        let result = "cash_in".parse::<TransactionCategory>();

        assert!(matches!(result, Err(Error::InvalidCategory(_))));
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&TransactionCategory::CashOut).unwrap();

        assert_eq!(json, r#""CASH_OUT""#);
    }
}
