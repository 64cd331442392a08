//! The dashboard page: the balance card, the add transaction form and the
//! user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_id},
    dashboard::{balance::Balance, form::add_transaction_form, list::transaction_list},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::get_transactions_for_user,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading users and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn balance_card(balance: &Balance) -> Markup {
    let total = balance.total();
    let total_style = if total < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    };

    html! {
        section
            id="balance"
            class="w-full bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-6 shadow-md"
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { "Balance" }
            p id="balance-total" class=(format!("text-3xl font-bold {total_style}"))
            {
                (format_currency(total))
            }

            div class="grid grid-cols-2 gap-4 mt-4"
            {
                div
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Income" }
                    p id="balance-income" class="text-lg font-semibold text-green-600 dark:text-green-400"
                    {
                        (format_currency(balance.income))
                    }
                }

                div
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Expenses" }
                    p id="balance-expenses" class="text-lg font-semibold text-red-600 dark:text-red-400"
                    {
                        (format_currency(balance.expenses))
                    }
                }
            }
        }
    }
}

fn dashboard_view(user: &User, balance: &Balance, transaction_list: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(format!("{PAGE_CONTAINER_STYLE} max-w-screen-md gap-8"))
        {
            h1 class="w-full text-2xl font-bold" { "Welcome back, " (user.name) }

            (balance_card(balance))

            section
                class="w-full bg-white dark:bg-gray-800 border border-gray-200
                    dark:border-gray-700 rounded-lg p-6 shadow-md"
            {
                h2 class="text-xl font-semibold mb-4" { "Add Transaction" }

                (add_transaction_form())
            }

            (transaction_list)
        }
    );

    base("Dashboard", &[dollar_input_styles()], &content)
}

/// Display the dashboard for the logged-in user.
///
/// # Errors
/// Returns an error if the user or their transactions could not be read, or
/// the server's timezone is invalid.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let balance = Balance::from_transactions(&transactions);
    let transaction_list = transaction_list(&transactions, local_offset);

    Ok(dashboard_view(&user, &balance, transaction_list).into_response())
}
