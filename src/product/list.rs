//! Catalog browsing and search endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    product::{Product, SearchQuery, get_all_products, search_products},
};

/// The state needed for reading and writing the catalog.
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CatalogState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every product in the catalog.
pub async fn view_products_endpoint(
    State(state): State<CatalogState>,
) -> Result<Json<Vec<Product>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let products = get_all_products(&connection)?;

    Ok(Json(products))
}

/// Search the catalog for products whose name contains the `name` query parameter.
///
/// # Errors
///
/// Returns an [Error::Validation] if the search term is empty.
pub async fn search_products_endpoint(
    State(state): State<CatalogState>,
    WithRejection(Query(query), _): WithRejection<Query<SearchQuery>, Error>,
) -> Result<Json<Vec<Product>>, Error> {
    let term = query.name.trim();

    if term.is_empty() {
        return Err(Error::Validation("search term cannot be empty".to_owned()));
    }

    let connection = lock_connection(&state.db_connection)?;
    let products = search_products(term, &connection)?;

    tracing::debug!("Search for {term:?} matched {} products", products.len());

    Ok(Json(products))
}
