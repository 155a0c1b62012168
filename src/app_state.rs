//! Implements a struct that holds the state of the REST server.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;

use crate::{Error, auth::TokenKeys, db::initialize};

/// How long requests may take before they are cancelled.
///
/// Single-record reads and writes get the short timeout, requests that
/// aggregate over a user's records get the long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeouts {
    /// The timeout for operations that touch a single record.
    pub short: Duration,
    /// The timeout for operations that aggregate over many records.
    pub long: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            long: Duration::from_secs(30),
        }
    }
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The keys used for signing and verifying session tokens.
    pub token_keys: TokenKeys,

    /// The bcrypt cost used when hashing new passwords.
    pub hash_cost: u32,

    /// Request timeouts per operation class.
    pub timeouts: OperationTimeouts,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `token_secret` is used to derive the keys for signing session tokens.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        token_secret: &str,
        hash_cost: u32,
        timeouts: OperationTimeouts,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            token_keys: TokenKeys::from_secret(token_secret),
            hash_cost,
            timeouts,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
