//! The API endpoints URIs.
//!
//! Routes ending in `_VIEW` serve full pages, routes under `/api` serve HTMX
//! fragments, redirects or JSON.

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, with their balance and transactions.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to submit new transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the category `<option>`s that match a flow direction.
pub const CATEGORY_OPTIONS: &str = "/api/transactions/categories";
/// The route for checking a transaction without saving it.
pub const FRAUD_CHECK_API: &str = "/api/fraud-check";
/// The route for the fraud check status shown in the add transaction form.
pub const FRAUD_CHECK_PREVIEW: &str = "/api/fraud-check/preview";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_OPTIONS);
        assert_endpoint_is_valid_uri(endpoints::FRAUD_CHECK_API);
        assert_endpoint_is_valid_uri(endpoints::FRAUD_CHECK_PREVIEW);
    }
}
