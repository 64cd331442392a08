//! User accounts and cookie based sessions.
//!
//! Users register with a name, email and password, then log in to receive a
//! private cookie holding a session [token::Token]. The [auth_guard]
//! middleware checks that cookie on protected routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use user::{User, UserID, create_user_table, get_user_by_email, get_user_by_id};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub(crate) use middleware::AuthState;
#[cfg(test)]
pub(crate) use user::{NewUser, create_user};
