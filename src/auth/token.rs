//! Issues and validates the signed session tokens handed out at sign up and log in.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::User, user::UserID};

/// How long an access token is valid for.
pub const ACCESS_TOKEN_DURATION: Duration = Duration::hours(24);

/// How long a refresh token is valid for.
pub const REFRESH_TOKEN_DURATION: Duration = Duration::hours(168);

/// The keys used for signing and verifying tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Derive the signing keys from a `secret` string.
    pub fn from_secret(secret: &str) -> Self {
        let hash = Sha512::digest(secret);

        Self {
            encoding_key: EncodingKey::from_secret(hash.as_slice()),
            decoding_key: DecodingKey::from_secret(hash.as_slice()),
        }
    }
}

/// Which of the two tokens in a [TokenPair] a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Sent in the `token` header to access protected routes.
    Access,
    /// Only good for getting a new access token, never for accessing protected routes.
    Refresh,
}

/// The contents of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub email: String,
    /// First name of the user the token was issued to.
    pub first_name: String,
    /// Last name of the user the token was issued to.
    pub last_name: String,
    /// ID of the user the token was issued to.
    pub uid: UserID,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
    /// Whether this is an access or a refresh token.
    pub typ: TokenType,
}

impl Claims {
    fn for_user(user: &User, issued_at: OffsetDateTime, typ: TokenType) -> Self {
        let duration = match typ {
            TokenType::Access => ACCESS_TOKEN_DURATION,
            TokenType::Refresh => REFRESH_TOKEN_DURATION,
        };

        Self {
            email: user.email.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            uid: user.id,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + duration).unix_timestamp(),
            typ,
        }
    }

    /// Check that these claims were issued to the user with `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::UserMismatch] if the token belongs to another user.
    pub fn authorize(&self, user_id: UserID) -> Result<(), Error> {
        if self.uid == user_id {
            Ok(())
        } else {
            tracing::warn!("User {} tried to act on behalf of user {user_id}", self.uid);
            Err(Error::UserMismatch)
        }
    }
}

/// An access token and the matching refresh token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short lived token sent in the `token` header.
    pub token: String,
    /// Long lived token.
    pub refresh_token: String,
}

/// Issue an access token and a refresh token for `user`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if a token could not be signed.
pub fn issue_token_pair(user: &User, keys: &TokenKeys) -> Result<TokenPair, Error> {
    let now = OffsetDateTime::now_utc();

    let token = encode_token(&Claims::for_user(user, now, TokenType::Access), keys)?;
    let refresh_token = encode_token(&Claims::for_user(user, now, TokenType::Refresh), keys)?;

    tracing::debug!("Issued tokens for user {}", user.id);

    Ok(TokenPair {
        token,
        refresh_token,
    })
}

/// Sign `claims` into a token string.
pub fn encode_token(claims: &Claims, keys: &TokenKeys) -> Result<String, Error> {
    encode(&Header::new(Algorithm::HS256), claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::TokenExpired] if the token is past its expiry time, or
/// [Error::TokenInvalid] if the token is malformed or was signed with a different key.
pub fn validate_token(token: &str, keys: &TokenKeys) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &keys.decoding_key, &validation)
        .map(|token_data| token_data.claims)
        .map_err(|error| match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                tracing::warn!("Token expired");
                Error::TokenExpired
            }
            _ => {
                tracing::warn!("Invalid token: {error}");
                Error::TokenInvalid
            }
        })
}
