//! Totals shown in the balance card.

use crate::transaction::{FlowDirection, Transaction};

/// A user's income and expenses added up.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Balance {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses, as a positive number.
    pub expenses: f64,
}

impl Balance {
    /// Add up `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut balance, transaction| {
                match transaction.direction {
                    FlowDirection::Income => balance.income += transaction.amount,
                    FlowDirection::Expense => balance.expenses += transaction.amount,
                }

                balance
            })
    }

    /// Income minus expenses.
    pub fn total(&self) -> f64 {
        self.income - self.expenses
    }
}
