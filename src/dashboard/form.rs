//! The form for adding a transaction.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner, text_input,
    },
    transaction::{FlowDirection, category_options},
};

/// The direction selected when the form is first shown.
const DEFAULT_DIRECTION: FlowDirection = FlowDirection::Expense;

fn direction_radio(direction: FlowDirection) -> Markup {
    let id = format!("direction-{}", direction.as_str());

    html! {
        div class="flex-1"
        {
            input
                type="radio"
                name="direction"
                id=(id)
                value=(direction.as_str())
                class=(FORM_RADIO_INPUT_STYLE)
                required
                checked[direction == DEFAULT_DIRECTION]
                hx-get=(endpoints::CATEGORY_OPTIONS)
                hx-target="#category"
                hx-swap="innerHTML"
                hx-target-error="#alert-container";

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (direction.label()) }
        }
    }
}

/// The add transaction form.
///
/// Picking a direction swaps in the categories allowed for it. Changing the
/// amount or category shows whether the fraud check would let the transaction
/// through. Errors and fraud rejections are shown in the alert container.
pub(super) fn add_transaction_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4"
        {
            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (direction_radio(FlowDirection::Income))
                    (direction_radio(FlowDirection::Expense))
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE) required
                {
                    (category_options(DEFAULT_DIRECTION, None))
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper"
                {
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        min="0.01"
                        step="0.01"
                        placeholder="0.00"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }
            }

            (text_input("text", "description", "Description", "", None))

            div
                id="fraud-status"
                hx-post=(endpoints::FRAUD_CHECK_PREVIEW)
                hx-trigger="input changed delay:500ms from:#amount, change from:#category"
                hx-include="closest form"
                hx-indicator="#fraud-check-indicator"
                aria-live="polite"
            {}

            p
                id="fraud-check-indicator"
                class="htmx-indicator text-sm text-gray-500 dark:text-gray-400"
            {
                "Verifying transaction safety..."
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add Transaction"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_select, assert_form_submit_button, assert_hx_endpoint,
            assert_valid_html, must_get_form,
        },
    };

    use super::add_transaction_form;

    #[test]
    fn form_posts_to_transactions_api() {
        let html = Html::parse_fragment(&add_transaction_form().into_string());
        assert_valid_html(&html);
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_eq!(form.value().attr("hx-target-error"), Some("#alert-container"));
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "direction", "radio");
        assert_form_submit_button(&form);
    }

    #[test]
    fn category_select_starts_with_expense_categories() {
        let html = Html::parse_fragment(&add_transaction_form().into_string());
        let form = must_get_form(&html);

        let options = assert_form_select(&form, "category");

        assert_eq!(options, ["CASH_OUT", "PAYMENT", "TRANSFER"]);
    }

    #[test]
    fn direction_radios_fetch_category_options() {
        let html = Html::parse_fragment(&add_transaction_form().into_string());
        let radios: Vec<_> = html
            .select(&Selector::parse("input[name=direction]").unwrap())
            .collect();

        assert_eq!(radios.len(), 2);
        for radio in radios {
            assert_hx_endpoint(&radio, endpoints::CATEGORY_OPTIONS, "hx-get");
            assert_eq!(radio.value().attr("hx-target"), Some("#category"));
        }
    }

    #[test]
    fn amount_must_be_positive() {
        let html = Html::parse_fragment(&add_transaction_form().into_string());
        let amount = html
            .select(&Selector::parse("input[name=amount]").unwrap())
            .next()
            .expect("No amount input");

        assert_eq!(amount.value().attr("min"), Some("0.01"));
        assert_eq!(amount.value().attr("step"), Some("0.01"));
    }

    #[test]
    fn amount_and_category_changes_request_fraud_status() {
        let html = Html::parse_fragment(&add_transaction_form().into_string());
        let status = html
            .select(&Selector::parse("#fraud-status").unwrap())
            .next()
            .expect("No fraud status container");

        assert_hx_endpoint(&status, endpoints::FRAUD_CHECK_PREVIEW, "hx-post");
        let trigger = status.value().attr("hx-trigger").unwrap_or_default();
        assert!(trigger.contains("from:#amount"), "{trigger}");
        assert!(trigger.contains("from:#category"), "{trigger}");
        assert_eq!(status.value().attr("hx-include"), Some("closest form"));

        let indicator = html
            .select(&Selector::parse("#fraud-check-indicator").unwrap())
            .next()
            .expect("No fraud check indicator");
        assert_eq!(
            indicator.text().collect::<String>(),
            "Verifying transaction safety..."
        );
    }
}
