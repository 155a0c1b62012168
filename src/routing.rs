//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use tower_http::timeout::TimeoutLayer;

use crate::{
    AppState, Error,
    address::{
        add_address_endpoint, delete_addresses_endpoint, edit_home_address_endpoint,
        edit_work_address_endpoint, list_addresses_endpoint,
    },
    auth::auth_guard,
    cart::{
        add_to_cart_endpoint, checkout_endpoint, instant_buy_endpoint, list_cart_endpoint,
        list_orders_endpoint, remove_item_endpoint,
    },
    endpoints,
    product::{add_product_endpoint, search_products_endpoint, view_products_endpoint},
    user::{log_in, sign_up},
};

/// Return a router with all the app's routes.
///
/// Routes that touch a single record get the short timeout from [AppState::timeouts], routes
/// that aggregate over a user's records get the long one.
pub fn build_router(state: AppState) -> Router {
    // Timed out requests get a 408 response.
    let short_timeout = TimeoutLayer::new(state.timeouts.short);
    let long_timeout = TimeoutLayer::new(state.timeouts.long);

    let unprotected_routes = Router::new()
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::PRODUCT_VIEW, get(view_products_endpoint))
        .layer(short_timeout.clone())
        .merge(
            Router::new()
                .route(endpoints::SEARCH, get(search_products_endpoint))
                .layer(long_timeout.clone()),
        );

    let protected_routes = Router::new()
        .route(endpoints::ADD_PRODUCT, post(add_product_endpoint))
        .route(endpoints::CART_ADD, get(add_to_cart_endpoint))
        .route(endpoints::CART_REMOVE, get(remove_item_endpoint))
        .route(endpoints::CART_BUY, get(instant_buy_endpoint))
        .route(
            endpoints::ADDRESS_EDIT_HOME,
            put(edit_home_address_endpoint),
        )
        .route(
            endpoints::ADDRESS_EDIT_WORK,
            put(edit_work_address_endpoint),
        )
        .route(endpoints::ADDRESS_DELETE, delete(delete_addresses_endpoint))
        .layer(short_timeout)
        .merge(
            Router::new()
                .route(endpoints::CART_LIST, get(list_cart_endpoint))
                .route(endpoints::CART_CHECKOUT, get(checkout_endpoint))
                .route(endpoints::CART_ORDERS, get(list_orders_endpoint))
                .route(endpoints::ADDRESS_LIST, get(list_addresses_endpoint))
                .route(endpoints::ADDRESS_ADD, post(add_address_endpoint))
                .layer(long_timeout),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
