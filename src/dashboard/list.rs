//! The table of a user's transactions.

use maud::{Markup, html};
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    html::{
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, VERIFIED_BADGE_STYLE,
        format_currency,
    },
    transaction::{FlowDirection, FraudCheckStatus, Transaction},
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[day] [month repr:short] [year]");

fn format_amount(transaction: &Transaction) -> (String, &'static str) {
    match transaction.direction {
        FlowDirection::Income => (
            format!("+{}", format_currency(transaction.amount)),
            "text-green-600 dark:text-green-400",
        ),
        FlowDirection::Expense => (
            format_currency(transaction.signed_amount()),
            "text-red-600 dark:text-red-400",
        ),
    }
}

fn transaction_row(transaction: &Transaction, local_offset: UtcOffset) -> Markup {
    let created_at = transaction.created_at.to_offset(local_offset);
    let date = created_at
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| created_at.date().to_string());
    let (amount, amount_style) = format_amount(transaction);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                p class="font-medium" { (transaction.description) }
                p class="text-xs text-gray-500 dark:text-gray-400" { (date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.category.label()) }
            td class=(format!("{TABLE_CELL_STYLE} text-right font-semibold {amount_style}"))
            {
                (amount)
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.fraud_check.status == FraudCheckStatus::Safe {
                    span class=(VERIFIED_BADGE_STYLE) { "Verified" }
                }
            }
        }
    }
}

/// The user's transactions, newest first, with dates shown in `local_offset`.
pub(super) fn transaction_list(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    html! {
        section id="transactions" class="w-full"
        {
            h2 class="text-xl font-semibold mb-4" { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No transactions yet. Add one with the form above."
                }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(format!("{TABLE_CELL_STYLE} text-right")) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, local_offset))
                            }
                        }
                    }
                }
            }
        }
    }
}
