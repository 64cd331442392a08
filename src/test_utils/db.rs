use rusqlite::Connection;

use crate::auth::{NewUser, PasswordHash, UserID, create_user};

/// Register a user with `email` and return their ID.
///
/// The password hash is a placeholder, so the user cannot log in.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> UserID {
    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: email.parse().expect("Invalid test email"),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user")
    .id
}
