//! Endpoints for overwriting the home or work address.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    address::{Address, AddressForm, AddressSlot, AddressState, edit_address},
    auth::Claims,
    db::lock_connection,
    user::UserQuery,
};

/// Overwrite a user's home address.
pub async fn edit_home_address_endpoint(
    State(state): State<AddressState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<AddressForm>, Error>,
) -> Result<Json<Address>, Error> {
    claims.authorize(query.id)?;
    edit_slot(state, query, AddressSlot::Home, form)
}

/// Overwrite a user's work address.
pub async fn edit_work_address_endpoint(
    State(state): State<AddressState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<AddressForm>, Error>,
) -> Result<Json<Address>, Error> {
    claims.authorize(query.id)?;
    edit_slot(state, query, AddressSlot::Work, form)
}

fn edit_slot(
    state: AddressState,
    query: UserQuery,
    slot: AddressSlot,
    form: AddressForm,
) -> Result<Json<Address>, Error> {
    let form = form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let address = edit_address(query.id, slot, form, &connection)?;

    tracing::info!("Updated {slot} address of user {}", query.id);

    Ok(Json(address))
}
