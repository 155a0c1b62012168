//! Endpoints for placing orders.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    auth::Claims,
    cart::{CartState, InstantBuyQuery, Order, checkout, instant_buy},
    db::lock_connection,
    user::UserQuery,
};

/// Check out a user's cart and respond with the new order.
pub async fn checkout_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
) -> Result<Json<Order>, Error> {
    claims.authorize(query.id)?;

    let connection = lock_connection(&state.db_connection)?;
    let order = checkout(query.id, &connection)?;

    tracing::info!(
        "User {} placed order {} for {}",
        query.id,
        order.id,
        order.price
    );

    Ok(Json(order))
}

/// Buy a single product for a user and respond with the new order.
pub async fn instant_buy_endpoint(
    State(state): State<CartState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<InstantBuyQuery>, Error>,
) -> Result<Json<Order>, Error> {
    claims.authorize(query.user_id)?;

    let connection = lock_connection(&state.db_connection)?;
    let order = instant_buy(query.product_id, query.user_id, &connection)?;

    tracing::info!(
        "User {} bought product {} in order {}",
        query.user_id,
        query.product_id,
        order.id
    );

    Ok(Json(order))
}

#[cfg(test)]
mod checkout_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        cart::{CartLine, CartState, Order, PaymentMethod, add_to_cart, cart_total, get_orders},
        endpoints,
        product::Product,
        test_utils::{
            create_test_product, create_test_user, get_test_claims, get_test_connection,
        },
        user::{User, UserID},
    };

    use super::{checkout_endpoint, instant_buy_endpoint};

    fn get_test_server() -> (TestServer, CartState, User, Product) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let product = create_test_product(&connection);
        let state = CartState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let server = get_test_server_for(state.clone(), user.id);

        (server, state, user, product)
    }

    fn get_test_server_for(state: CartState, token_user_id: UserID) -> TestServer {
        let app = Router::new()
            .route(endpoints::CART_CHECKOUT, get(checkout_endpoint))
            .route(endpoints::CART_BUY, get(instant_buy_endpoint))
            .layer(Extension(get_test_claims(token_user_id)))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn checkout_returns_order() {
        let (server, state, user, product) = get_test_server();
        add_to_cart(product.id, user.id, &state.db_connection.lock().unwrap()).unwrap();

        let response = server
            .get(endpoints::CART_CHECKOUT)
            .add_query_param("id", user.id)
            .await;

        response.assert_status_ok();
        let order = response.json::<Order>();
        assert_eq!(order.price, u64::from(product.price));
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.order_list, vec![CartLine::from(&product)]);
        assert_eq!(
            cart_total(user.id, &state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_is_rejected() {
        let (server, _, user, _) = get_test_server();

        let response = server
            .get(endpoints::CART_CHECKOUT)
            .add_query_param("id", user.id)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "the cart is empty" }));
    }

    #[tokio::test]
    async fn instant_buy_returns_order() {
        let (server, _, user, product) = get_test_server();

        let response = server
            .get(endpoints::CART_BUY)
            .add_query_param("userid", user.id)
            .add_query_param("pid", product.id)
            .await;

        response.assert_status_ok();
        let order = response.json::<Order>();
        assert_eq!(order.price, u64::from(product.price));
        assert_eq!(order.order_list, vec![CartLine::from(&product)]);
    }

    #[tokio::test]
    async fn instant_buy_of_unknown_product_returns_not_found() {
        let (server, _, user, product) = get_test_server();

        let response = server
            .get(endpoints::CART_BUY)
            .add_query_param("userid", user.id)
            .add_query_param("pid", product.id + 1)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn instant_buy_for_unknown_user_fails() {
        let (_, state, user, product) = get_test_server();
        let unknown_user_id = UserID::new(user.id.as_i64() + 1);
        let server = get_test_server_for(state, unknown_user_id);

        let response = server
            .get(endpoints::CART_BUY)
            .add_query_param("userid", unknown_user_id)
            .add_query_param("pid", product.id)
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "cannot update the purchase" }));
    }

    #[tokio::test]
    async fn checkout_of_another_users_cart_is_unauthorized() {
        let (_, state, user, product) = get_test_server();
        add_to_cart(product.id, user.id, &state.db_connection.lock().unwrap()).unwrap();
        let server = get_test_server_for(state.clone(), UserID::new(user.id.as_i64() + 1));

        let response = server
            .get(endpoints::CART_CHECKOUT)
            .add_query_param("id", user.id)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(cart_total(user.id, &connection), Ok(u64::from(product.price)));
        assert_eq!(get_orders(user.id, &connection).map(|orders| orders.len()), Ok(0));
    }

    #[tokio::test]
    async fn instant_buy_with_malformed_query_is_rejected() {
        let (server, _, user, _) = get_test_server();

        let response = server
            .get(endpoints::CART_BUY)
            .add_query_param("userid", user.id)
            .add_query_param("pid", "milk")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }
}
