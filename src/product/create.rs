//! Endpoint for adding products to the catalog.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    db::lock_connection,
    product::{CatalogState, NewProduct, Product, create_product},
};

/// Add a product to the catalog.
///
/// Responds with 201 and the stored product.
pub async fn add_product_endpoint(
    State(state): State<CatalogState>,
    WithRejection(Json(new_product), _): WithRejection<Json<NewProduct>, Error>,
) -> Result<(StatusCode, Json<Product>), Error> {
    let new_product = new_product.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let product = create_product(new_product, &connection)?;

    tracing::info!("Added product {} ({})", product.id, product.name);

    Ok((StatusCode::CREATED, Json(product)))
}
