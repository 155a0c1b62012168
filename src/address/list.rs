//! Address book listing endpoint.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    address::{Address, AddressState, get_address_book},
    auth::Claims,
    db::lock_connection,
    user::UserQuery,
};

/// Respond with a user's addresses, home first.
pub async fn list_addresses_endpoint(
    State(state): State<AddressState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
) -> Result<Json<Vec<Address>>, Error> {
    claims.authorize(query.id)?;

    let connection = lock_connection(&state.db_connection)?;
    let addresses = get_address_book(query.id, &connection)?;

    Ok(Json(addresses))
}
