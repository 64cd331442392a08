//! The dashboard is the home page for logged-in users.
//!
//! It shows the user's balance, a form for adding transactions and the list
//! of transactions they have added.

mod balance;
mod form;
mod list;
mod page;

pub use page::get_dashboard_page;
