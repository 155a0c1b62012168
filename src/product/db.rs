//! Database operations for the product catalog.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    product::{NewProduct, Product, ProductId},
};

/// Insert a product into the catalog and return it with its generated ID.
pub fn create_product(product: NewProduct, connection: &Connection) -> Result<Product, Error> {
    connection.execute(
        "INSERT INTO product (name, price, rating, image) VALUES (?1, ?2, ?3, ?4);",
        (&product.name, product.price, product.rating, &product.image),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Product {
        id,
        name: product.name,
        price: product.price,
        rating: product.rating,
        image: product.image,
    })
}

/// Retrieve a single product by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no product with `product_id`.
pub fn get_product(product_id: ProductId, connection: &Connection) -> Result<Product, Error> {
    connection
        .prepare("SELECT id, name, price, rating, image FROM product WHERE id = :id;")?
        .query_row(&[(":id", &product_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve every product in the catalog, oldest first.
pub fn get_all_products(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare("SELECT id, name, price, rating, image FROM product ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the products whose name contains `query`, ignoring case.
pub fn search_products(query: &str, connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare(
            "SELECT id, name, price, rating, image FROM product
            WHERE instr(lower(name), lower(:query)) > 0
            ORDER BY id ASC;",
        )?
        .query_map(&[(":query", query)], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Initialize the product table.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            rating INTEGER NOT NULL DEFAULT 0,
            image TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_product_name ON product(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        rating: row.get(3)?,
        image: row.get(4)?,
    })
}
