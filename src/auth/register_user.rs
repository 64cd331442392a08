//! The registration page for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, User, ValidatedPassword, set_auth_cookie,
        user::{NewUser, create_user},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register, password_input, text_input,
    },
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

/// Error messages to show next to the fields of the registration form.
#[derive(Debug, Default, PartialEq)]
struct RegistrationErrors {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

fn registration_form(form: &RegisterForm, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("text", "name", "Name", &form.name, errors.name.as_deref()))
            (text_input("email", "email", "Email", &form.email, errors.email.as_deref()))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, errors.password.as_deref()))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password.as_deref()))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form =
        registration_form(&RegisterForm::default(), &RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing the new user's password.
    pub hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Check the form fields, collecting an error message for each invalid field.
fn validate(
    form: &RegisterForm,
) -> Result<(String, EmailAddress, ValidatedPassword), RegistrationErrors> {
    let mut errors = RegistrationErrors::default();

    let name = form.name.trim();
    if name.is_empty() {
        errors.name = Some(Error::EmptyName.to_string());
    }

    let email = form.email.trim();
    let parsed_email = email.parse::<EmailAddress>().ok();
    if parsed_email.is_none() {
        errors.email = Some(Error::InvalidEmail(email.to_owned()).to_string());
    }

    let password = match ValidatedPassword::new(&form.password, &[name, email]) {
        Ok(password) => Some(password),
        Err(error) => {
            errors.password = Some(error.to_string());
            None
        }
    };

    if form.password != form.confirm_password {
        errors.confirm_password = Some("Passwords do not match".to_owned());
    }

    match (parsed_email, password) {
        (Some(email), Some(password)) if errors == RegistrationErrors::default() => {
            Ok((name.to_owned(), email, password))
        }
        _ => Err(errors),
    }
}

/// Handler for registration requests.
///
/// On success the new user is logged in and redirected to the dashboard.
/// Otherwise the form is returned with an error message next to each invalid field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let (name, email, validated_password) = match validate(&user_data) {
        Ok(fields) => fields,
        Err(errors) => return registration_form(&user_data, &errors).into_response(),
    };

    let password_hash = match PasswordHash::new(validated_password, state.hash_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Error hashing password: {error}");
            return internal_error_redirect();
        }
    };

    let new_user = NewUser {
        name,
        email,
        password_hash,
    };

    let user = match insert_user(&state.db_connection, new_user) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let errors = RegistrationErrors {
                email: Some(Error::DuplicateEmail.to_string()),
                ..Default::default()
            };
            return registration_form(&user_data, &errors).into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a user: {error}");
            return internal_error_redirect();
        }
    };

    tracing::info!(user_id = %user.id, "Registered new user");

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
    }
}

fn insert_user(db_connection: &Mutex<Connection>, new_user: NewUser) -> Result<User, Error> {
    let connection = db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    create_user(new_user, &connection)
}

fn internal_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
        .into_response()
}

#[cfg(test)]
mod register_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, create_user_table, get_user_by_email,
            user::count_users,
        },
        endpoints,
        test_utils::assert_hx_redirect,
    };

    use super::RegistrationState;

    const STRONG_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            cookie_key: Key::from(&Sha512::digest("42")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
            hash_cost: 4,
        }
    }

    fn get_test_server(state: RegistrationState) -> TestServer {
        let app = Router::new()
            .route(endpoints::USERS, post(super::register_user))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn registration_form<'a>(
        name: &'a str,
        email: &'a str,
        password: &'a str,
        confirm_password: &'a str,
    ) -> [(&'static str, &'a str); 4] {
        [
            ("name", name),
            ("email", email),
            ("password", password),
            ("confirm_password", confirm_password),
        ]
    }

    #[track_caller]
    fn assert_field_error(body: &str, field_id: &str) {
        let document = scraper::Html::parse_fragment(body);
        let selector =
            scraper::Selector::parse(&format!("input#{field_id} + p.text-red-500")).unwrap();

        assert_eq!(
            document.select(&selector).count(),
            1,
            "want an error message after #{field_id} in {body}"
        );
    }

    #[tokio::test]
    async fn create_user_logs_in_and_redirects_to_dashboard() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "Jane",
                "jane@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            ))
            .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(response.cookies().get(COOKIE_TOKEN).is_some());

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email("jane@example.com", &connection).unwrap();
        assert_eq!(user.name, "Jane");
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn create_user_fails_on_empty_name() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "   ",
                "jane@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            ))
            .await;

        response.assert_status_ok();
        assert_field_error(&response.text(), "name");
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn create_user_fails_on_invalid_email() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "Jane",
                "not-an-email",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            ))
            .await;

        assert_field_error(&response.text(), "email");
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn create_user_fails_on_weak_password() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "Jane",
                "jane@example.com",
                "password",
                "password",
            ))
            .await;

        assert_field_error(&response.text(), "password");
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn create_user_fails_on_mismatched_passwords() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "Jane",
                "jane@example.com",
                STRONG_PASSWORD,
                "thisisadifferentpassword",
            ))
            .await;

        assert_field_error(&response.text(), "confirm-password");
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn create_user_fails_on_duplicate_email() {
        let state = get_test_state();
        let server = get_test_server(state.clone());
        let form = registration_form("Jane", "jane@example.com", STRONG_PASSWORD, STRONG_PASSWORD);
        server.post(endpoints::USERS).form(&form).await;

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert_field_error(&response.text(), "email");
        assert!(response.text().contains("already in use"));
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn create_user_redirects_to_error_page_when_hashing_fails() {
        // bcrypt only accepts costs from 4 to 31.
        let state = RegistrationState {
            hash_cost: 3,
            ..get_test_state()
        };
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&registration_form(
                "Jane",
                "jane@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            ))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_hx_redirect(&response, endpoints::INTERNAL_ERROR_VIEW);
        assert!(response.cookies().get(COOKIE_TOKEN).is_none());
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }
}
