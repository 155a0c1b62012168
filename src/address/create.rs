//! Endpoint for adding an address to a user's address book.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    address::{Address, AddressForm, add_address},
    auth::Claims,
    db::lock_connection,
    user::UserQuery,
};

/// The state needed by the address book endpoints.
#[derive(Debug, Clone)]
pub struct AddressState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddressState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Add an address to the first free slot and respond with 201 and the stored address.
pub async fn add_address_endpoint(
    State(state): State<AddressState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<AddressForm>, Error>,
) -> Result<(StatusCode, Json<Address>), Error> {
    claims.authorize(query.id)?;
    let form = form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let address = add_address(query.id, form, &connection)?;

    tracing::info!("Added {} address for user {}", address.slot, query.id);

    Ok((StatusCode::CREATED, Json(address)))
}

#[cfg(test)]
mod add_address_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        address::{Address, AddressSlot},
        endpoints,
        test_utils::{create_test_user, get_test_claims, get_test_connection},
        user::User,
    };

    use super::{AddressState, add_address_endpoint};

    fn get_test_server() -> (TestServer, User) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let app = Router::new()
            .route(endpoints::ADDRESS_ADD, post(add_address_endpoint))
            .layer(Extension(get_test_claims(user.id)))
            .with_state(AddressState {
                db_connection: Arc::new(Mutex::new(connection)),
            });

        (
            TestServer::try_new(app).expect("Could not create test server."),
            user,
        )
    }

    fn address_body(city: &str) -> serde_json::Value {
        json!({
            "city": city,
            "street": "Queen Street",
            "house": "12",
            "postal_code": "1010",
        })
    }

    #[tokio::test]
    async fn add_address_fills_home_then_work() {
        let (server, user) = get_test_server();

        let home = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id)
            .json(&address_body("Auckland"))
            .await;
        let work = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id)
            .json(&address_body("Wellington"))
            .await;

        home.assert_status(StatusCode::CREATED);
        work.assert_status(StatusCode::CREATED);
        assert_eq!(home.json::<Address>().slot, AddressSlot::Home);
        assert_eq!(work.json::<Address>().slot, AddressSlot::Work);
    }

    #[tokio::test]
    async fn third_address_is_rejected() {
        let (server, user) = get_test_server();
        for city in ["Auckland", "Wellington"] {
            server
                .post(endpoints::ADDRESS_ADD)
                .add_query_param("id", user.id)
                .json(&address_body(city))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id)
            .json(&address_body("Christchurch"))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({ "error": "address limit exceeded" }));
    }

    #[tokio::test]
    async fn empty_field_is_rejected() {
        let (server, user) = get_test_server();

        let response = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id)
            .json(&address_body(""))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "city cannot be empty" }));
    }

    #[tokio::test]
    async fn missing_field_is_rejected_with_json_error() {
        let (server, user) = get_test_server();

        let response = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id)
            .json(&json!({ "city": "Auckland" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|message| message.contains("missing field `street`")),
            "unexpected body: {body}"
        );
    }

    #[tokio::test]
    async fn add_address_for_another_user_is_unauthorized() {
        let (server, user) = get_test_server();

        let response = server
            .post(endpoints::ADDRESS_ADD)
            .add_query_param("id", user.id.as_i64() + 1)
            .json(&address_body("Auckland"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "error": "token does not belong to this user" }));
    }
}
