//! The category `<option>`s for the add transaction form.
//!
//! The form swaps these in with HTMX whenever the flow direction changes, so
//! only the categories that go with the direction can be picked.

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{fraud::TransactionCategory, transaction::FlowDirection};

/// Render one `<option>` per category allowed for `direction`.
///
/// `selected` is marked as selected if it is one of the options, otherwise the
/// first option is selected.
pub fn category_options(direction: FlowDirection, selected: Option<TransactionCategory>) -> Markup {
    let categories = direction.categories();
    let selected = selected
        .filter(|category| direction.allows(*category))
        .or_else(|| categories.first().copied());

    html! {
        @for category in categories {
            option value=(category.as_str()) selected[Some(*category) == selected] {
                (category.label())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryOptionsQuery {
    pub direction: String,
}

/// Route handler for the category options of a flow direction.
pub async fn get_category_options(Query(query): Query<CategoryOptionsQuery>) -> Response {
    match query.direction.parse::<FlowDirection>() {
        Ok(direction) => category_options(direction, None).into_response(),
        Err(error) => error.into_alert_response(),
    }
}
