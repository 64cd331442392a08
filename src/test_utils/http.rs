use axum_test::TestResponse;

/// Assert that an HTMX endpoint told the client to navigate to `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &TestResponse, endpoint: &str) {
    assert_eq!(
        response.header("hx-redirect"),
        endpoint,
        "want HX-Redirect to {endpoint}"
    );
}
