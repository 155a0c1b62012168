//! Core user domain types.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash, auth::TokenPair};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered customer.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The email the user logs in with.
    pub email: EmailAddress,
    /// The user's phone number.
    pub phone: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user signed up.
    pub created_at: OffsetDateTime,
    /// When the user record was last changed.
    pub updated_at: OffsetDateTime,
}

/// A user that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The email the user logs in with.
    pub email: EmailAddress,
    /// The user's phone number.
    pub phone: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The shortest name that will be accepted at sign up.
const NAME_MIN_LENGTH: usize = 2;
/// The longest name that will be accepted at sign up.
const NAME_MAX_LENGTH: usize = 30;

/// The request body for signing up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl SignUpForm {
    /// Check the fields of the form and hash the password with `hash_cost`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] describing the first field that is invalid,
    /// or an [Error::HashingError] if the password could not be hashed.
    pub fn validate(self, hash_cost: u32) -> Result<NewUser, Error> {
        let first_name = validate_name("first name", &self.first_name)?;
        let last_name = validate_name("last name", &self.last_name)?;

        let email = EmailAddress::from_str(self.email.trim())
            .map_err(|error| Error::Validation(format!("invalid email: {error}")))?;

        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(Error::Validation("phone is required".to_owned()));
        }

        let password_hash = PasswordHash::from_raw_password(&self.password, hash_cost)?;

        Ok(NewUser {
            first_name,
            last_name,
            email,
            phone: phone.to_owned(),
            password_hash,
        })
    }
}

fn validate_name(field: &str, name: &str) -> Result<String, Error> {
    let name = name.trim();
    let length = name.chars().count();

    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&length) {
        return Err(Error::Validation(format!(
            "{field} must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name.to_owned())
}

/// The request body for logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInForm {
    pub email: String,
    pub password: String,
}

/// The response body for a successful sign up or log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: UserID,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub token: String,
    pub refresh_token: String,
}

impl SessionResponse {
    /// Combine the public parts of `user` with a freshly issued token pair.
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            phone: user.phone.clone(),
            token: tokens.token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Query parameters for routes that act on a single user, e.g. `?id=1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserQuery {
    pub id: UserID,
}
