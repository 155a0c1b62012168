//! The log in endpoint which exchanges an email and password for session tokens.

use std::{str::FromStr, sync::Mutex};

use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    Error,
    auth::issue_token_pair,
    db::lock_connection,
    user::{
        AccountState, LogInForm, SessionResponse, User, get_user_by_email, update_user_tokens,
    },
};

/// Handler for log-in requests.
///
/// A fresh token pair is issued and stored on the user record.
///
/// # Errors
///
/// This function will return an [Error::InvalidCredentials] if:
/// - the email is not a valid email address,
/// - the email does not belong to a registered user,
/// - the password is not correct.
pub async fn log_in(
    State(state): State<AccountState>,
    WithRejection(Json(form), _): WithRejection<Json<LogInForm>, Error>,
) -> Result<Json<SessionResponse>, Error> {
    let email = EmailAddress::from_str(form.email.trim()).map_err(|_| Error::InvalidCredentials)?;

    let user = find_user(&email, &state.db_connection)?;

    let password_is_correct = user
        .password_hash
        .verify(&form.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        tracing::warn!("Failed log in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let tokens = issue_token_pair(&user, &state.token_keys)?;
    update_user_tokens(user.id, &tokens, &*lock_connection(&state.db_connection)?)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(SessionResponse::new(&user, tokens)))
}

/// Look up the user registered with `email`, holding the database lock only for the query.
fn find_user(email: &EmailAddress, db_connection: &Mutex<Connection>) -> Result<User, Error> {
    let connection = lock_connection(db_connection)?;

    get_user_by_email(email, &connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => {
            tracing::error!("Error matching user: {error}");
            error
        }
    })
}
