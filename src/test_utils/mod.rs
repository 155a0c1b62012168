#![allow(missing_docs)]

use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    AppState, OperationTimeouts, PasswordHash,
    auth::{Claims, TokenType},
    db::initialize,
    product::{NewProduct, Product, create_product},
    user::{NewUser, User, UserID, create_user},
};

/// The bcrypt cost used in tests, the lowest bcrypt accepts.
pub(crate) const TEST_HASH_COST: u32 = 4;

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(
        connection,
        "foobar",
        TEST_HASH_COST,
        OperationTimeouts::default(),
    )
    .expect("Could not create app state")
}

pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_user(
        NewUser {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: EmailAddress::from_str("a@b.com").expect("Invalid test email"),
            phone: "5550100".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user")
}

pub(crate) fn create_test_product(connection: &Connection) -> Product {
    create_product(
        NewProduct {
            name: "Alpine Milk".to_owned(),
            price: 100,
            rating: 4,
            image: "alpine_milk.png".to_owned(),
        },
        connection,
    )
    .expect("Could not create test product")
}

/// The claims of an access token issued to the user with `user_id`.
///
/// Layer these onto a router with `axum::Extension` to stand in for the auth guard.
pub(crate) fn get_test_claims(user_id: UserID) -> Claims {
    Claims {
        email: "a@b.com".to_owned(),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        uid: user_id,
        iat: 0,
        exp: i64::MAX,
        typ: TokenType::Access,
    }
}
