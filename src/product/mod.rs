//! The product catalog.

mod create;
mod db;
mod domain;
mod list;

pub use create::add_product_endpoint;
pub use db::{
    create_product, create_product_table, get_all_products, get_product, search_products,
};
pub use domain::{NewProduct, Product, ProductId, SearchQuery};
pub use list::{CatalogState, search_products_endpoint, view_products_endpoint};
