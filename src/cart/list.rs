//! Endpoints for viewing a cart and past orders.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    auth::Claims,
    cart::{Cart, CartState, Order, get_cart, get_orders},
    db::lock_connection,
    user::UserQuery,
};

/// Respond with the lines in a user's cart and their total price.
pub async fn list_cart_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
) -> Result<Json<Cart>, Error> {
    claims.authorize(query.id)?;

    let connection = lock_connection(&state.db_connection)?;
    let cart = get_cart(query.id, &connection)?;

    Ok(Json(cart))
}

/// Respond with a user's orders, oldest first.
pub async fn list_orders_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
) -> Result<Json<Vec<Order>>, Error> {
    claims.authorize(query.id)?;

    let connection = lock_connection(&state.db_connection)?;
    let orders = get_orders(query.id, &connection)?;

    Ok(Json(orders))
}
