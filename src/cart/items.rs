//! Endpoints for putting products in a cart and taking them out again.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Claims,
    cart::{CartItemQuery, CartLine, add_to_cart, remove_item},
    db::lock_connection,
};

/// The state needed by the cart and order endpoints.
#[derive(Debug, Clone)]
pub struct CartState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CartState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a removal from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedItems {
    /// How many cart lines were removed.
    pub removed: usize,
}

/// Add a product to a user's cart and respond with the stored line.
pub async fn add_to_cart_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<CartItemQuery>, Error>,
) -> Result<Json<CartLine>, Error> {
    claims.authorize(query.user_id)?;

    let connection = lock_connection(&state.db_connection)?;
    let line = add_to_cart(query.id, query.user_id, &connection)?;

    tracing::info!("Added product {} to cart of user {}", query.id, query.user_id);

    Ok(Json(line))
}

/// Remove every line of a product from a user's cart.
pub async fn remove_item_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<CartItemQuery>, Error>,
) -> Result<Json<RemovedItems>, Error> {
    claims.authorize(query.user_id)?;

    let connection = lock_connection(&state.db_connection)?;
    let removed = remove_item(query.id, query.user_id, &connection)?;

    tracing::info!(
        "Removed {removed} lines of product {} from cart of user {}",
        query.id,
        query.user_id
    );

    Ok(Json(RemovedItems { removed }))
}
