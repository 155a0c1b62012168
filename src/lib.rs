//! Storefront is a REST backend for a small online shop.
//!
//! It handles user sign up and log in, product browsing and search, shopping
//! carts, checkout (from the cart or as an instant buy of a single product),
//! and a per-user address book with a home and a work address.
//!
//! All endpoints speak JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod address;
mod app_state;
mod auth;
mod cart;
mod db;
mod endpoints;
mod logging;
mod product;
mod routing;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, OperationTimeouts};
pub use auth::{PasswordHash, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use product::{NewProduct, Product, ProductId, create_product};
pub use routing::build_router;
pub use user::{NewUser, User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The broad category of an [Error], used to pick the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A product or user could not be found.
    NotFound,
    /// The client sent malformed or conflicting input.
    ValidationFailed,
    /// The request is missing a valid session token or credentials.
    Unauthorized,
    /// A read or write against the database failed.
    PersistenceFailed,
    /// The user has hit a hard limit, e.g. the number of addresses.
    LimitExceeded,
}

impl ErrorKind {
    /// The HTTP status code that should be sent for this kind of error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::LimitExceeded => StatusCode::CONFLICT,
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The product ID does not refer to a product in the catalog.
    #[error("can't find product")]
    ProductNotFound,

    /// The user record could not be updated, most likely because the user ID
    /// does not refer to a registered user.
    #[error("cannot update user")]
    UserUpdateFailed,

    /// The cart lines could not be removed.
    #[error("cannot remove item from cart")]
    ItemRemovalFailed,

    /// The cart could not be read because the user does not exist.
    #[error("cannot get items from cart")]
    CartUnavailable,

    /// Checking out the cart failed. Nothing was written.
    #[error("cannot complete the purchase")]
    CheckoutFailed,

    /// Checkout was requested for a cart with no lines in it.
    #[error("the cart is empty")]
    EmptyCart,

    /// The order for an instant buy could not be written.
    #[error("cannot update the purchase")]
    OrderUpdateFailed,

    /// The user already has a home and a work address.
    #[error("address limit exceeded")]
    AddressLimitExceeded,

    /// The address slot being edited has not been filled yet.
    #[error("no {0} address has been added")]
    SlotNotFound(String),

    /// The session token has expired.
    #[error("token is expired")]
    TokenExpired,

    /// The session token is malformed or was not signed by this server.
    #[error("token is invalid")]
    TokenInvalid,

    /// The session token belongs to a different user than the one the request is for.
    #[error("token does not belong to this user")]
    UserMismatch,

    /// The request did not include a `token` header.
    #[error("no authorization header provided")]
    MissingToken,

    /// The email and password do not match a registered user.
    #[error("login or password invalid")]
    InvalidCredentials,

    /// The email used to sign up already belongs to a user.
    #[error("user already exists")]
    DuplicateEmail,

    /// The phone number used to sign up already belongs to a user.
    #[error("phone is already in use")]
    DuplicatePhone,

    /// The client sent a field that failed validation.
    #[error("{0}")]
    Validation(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session tokens could not be signed.
    #[error("token creation failed: {0}")]
    TokenCreation(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProductNotFound | Error::CartUnavailable | Error::NotFound => {
                ErrorKind::NotFound
            }
            Error::SlotNotFound(_) => ErrorKind::NotFound,
            Error::EmptyCart
            | Error::DuplicateEmail
            | Error::DuplicatePhone
            | Error::Validation(_) => ErrorKind::ValidationFailed,
            Error::TokenExpired
            | Error::TokenInvalid
            | Error::MissingToken
            | Error::UserMismatch
            | Error::InvalidCredentials => ErrorKind::Unauthorized,
            Error::AddressLimitExceeded => ErrorKind::LimitExceeded,
            Error::UserUpdateFailed
            | Error::ItemRemovalFailed
            | Error::CheckoutFailed
            | Error::OrderUpdateFailed
            | Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => ErrorKind::PersistenceFailed,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.phone") =>
            {
                Error::DuplicatePhone
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let message = match self {
            // These carry internal details that are not intended to be shown to the client.
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);
                "Internal Server Error".to_owned()
            }
            error => error.to_string(),
        };

        (kind.status_code(), Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, ErrorKind};

    #[test]
    fn each_kind_has_a_stable_status() {
        assert_eq!(Error::ProductNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(Error::TokenExpired.kind(), ErrorKind::Unauthorized);
        assert_eq!(Error::AddressLimitExceeded.kind(), ErrorKind::LimitExceeded);
        assert_eq!(Error::CheckoutFailed.kind(), ErrorKind::PersistenceFailed);
        assert_eq!(
            Error::Validation("bad".to_owned()).kind(),
            ErrorKind::ValidationFailed
        );

        assert_eq!(
            Error::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::AddressLimitExceeded.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn user_update_failure_does_not_mention_the_cart() {
        assert_eq!(Error::UserUpdateFailed.to_string(), "cannot update user");
    }

    #[tokio::test]
    async fn internal_errors_are_not_leaked() {
        let response = Error::HashingError("secret detail".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8_lossy(&body);
        assert!(!body.contains("secret detail"), "leaked internal details: {body}");
    }
}
