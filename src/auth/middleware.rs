//! Authentication middleware that validates the session token header.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    auth::token::{TokenKeys, TokenType, validate_token},
};

/// The name of the request header that carries the access token.
pub const TOKEN_HEADER: &str = "token";

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        state.token_keys.clone()
    }
}

/// Middleware function that checks for a valid access token in the `token` header.
///
/// Refresh tokens are rejected with [Error::TokenInvalid]. The token's claims are placed into the request and then the request executed normally if the
/// token is valid, otherwise a 401 response with a JSON error body is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(claims): Extension<Claims>`
/// to receive the claims.
pub async fn auth_guard(
    State(keys): State<TokenKeys>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match request.headers().get(TOKEN_HEADER) {
        None => return Error::MissingToken.into_response(),
        Some(value) => match value.to_str() {
            Ok("") => return Error::MissingToken.into_response(),
            Ok(token) => validate_token(token, &keys),
            Err(_) => Err(Error::TokenInvalid),
        },
    };

    match claims {
        Ok(claims) if claims.typ != TokenType::Access => {
            tracing::warn!("Refresh token used as access token by user {}", claims.uid);
            Error::TokenInvalid.into_response()
        }
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}
