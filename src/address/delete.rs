//! Address book deletion endpoint.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    address::{AddressState, delete_addresses},
    auth::Claims,
    db::lock_connection,
    user::UserQuery,
};

/// The response body for clearing an address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAddresses {
    /// How many addresses were deleted.
    pub deleted: usize,
}

/// Delete both of a user's addresses.
pub async fn delete_addresses_endpoint(
    State(state): State<AddressState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
) -> Result<Json<DeletedAddresses>, Error> {
    claims.authorize(query.id)?;

    let connection = lock_connection(&state.db_connection)?;
    let deleted = delete_addresses(query.id, &connection)?;

    tracing::info!("Deleted {deleted} addresses of user {}", query.id);

    Ok(Json(DeletedAddresses { deleted }))
}

#[cfg(test)]
mod delete_addresses_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::delete};
    use axum_test::TestServer;

    use crate::{
        address::{AddressForm, AddressState, add_address, count_addresses},
        endpoints,
        test_utils::{create_test_user, get_test_claims, get_test_connection},
    };

    use super::{DeletedAddresses, delete_addresses_endpoint};

    #[tokio::test]
    async fn delete_removes_every_address() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        for city in ["Auckland", "Wellington"] {
            add_address(
                user.id,
                AddressForm {
                    city: city.to_owned(),
                    street: "Queen Street".to_owned(),
                    house: "12".to_owned(),
                    postal_code: "1010".to_owned(),
                },
                &connection,
            )
            .unwrap();
        }
        let state = AddressState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::ADDRESS_DELETE, delete(delete_addresses_endpoint))
            .layer(Extension(get_test_claims(user.id)))
            .with_state(state.clone());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .delete(endpoints::ADDRESS_DELETE)
            .add_query_param("id", user.id)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<DeletedAddresses>(),
            DeletedAddresses { deleted: 2 }
        );
        assert_eq!(
            count_addresses(user.id, &state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }
}
