//! The sign up endpoint for creating a new customer account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{TokenKeys, issue_token_pair},
    db::lock_connection,
    user::{SessionResponse, SignUpForm, create_user, update_user_tokens},
};

/// The state needed for signing up and logging in.
#[derive(Clone)]
pub struct AccountState {
    /// The keys for signing session tokens.
    pub token_keys: TokenKeys,
    /// The bcrypt cost used when hashing new passwords.
    pub hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            hash_cost: state.hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a user account and start a session for it.
///
/// Responds with 201 and the new user's profile and session tokens.
pub async fn sign_up(
    State(state): State<AccountState>,
    WithRejection(Json(form), _): WithRejection<Json<SignUpForm>, Error>,
) -> Result<(StatusCode, Json<SessionResponse>), Error> {
    let new_user = form.validate(state.hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(new_user, &connection).inspect_err(|error| {
        tracing::warn!("Could not sign up user: {error}");
    })?;

    let tokens = issue_token_pair(&user, &state.token_keys)?;
    update_user_tokens(user.id, &tokens, &connection)?;

    tracing::info!("Signed up user {}", user.id);

    Ok((StatusCode::CREATED, Json(SessionResponse::new(&user, tokens))))
}
