//! Alert messages for displaying errors to users.
//!
//! Alerts are returned as HTML fragments by endpoints that handle HTMX form
//! submissions. Forms target the `#alert-container` element in the base page
//! with `hx-target-error`, so error responses are shown in the alert container.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An error message with an optional line of details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }

    pub fn into_html(self) -> Markup {
        html! {
            div
                class="flex items-start p-4 mb-4 text-red-800 border border-red-300
                    rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400
                    dark:border-red-800"
                role="alert"
            {
                div
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex h-8 w-8"
                    aria-label="Close"
                    onclick="this.parentElement.remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert<'_> {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
