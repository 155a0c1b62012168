//! Database operations for carts and orders.
//!
//! Checkout and instant buy write the order and its lines in a single
//! transaction, so an order is either stored complete or not at all.

use std::fmt::Display;

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    cart::{Cart, CartLine, NewOrder, Order, PaymentMethod},
    db::current_timestamp,
    product::{ProductId, get_product},
    user::{UserID, user_exists},
};

/// Put a copy of the product in the user's cart.
///
/// Adding the same product twice gives two lines.
///
/// # Errors
///
/// Returns:
/// - [Error::ProductNotFound] if `product_id` does not refer to a product,
/// - [Error::UserUpdateFailed] if the line could not be stored, e.g. because
///   `user_id` does not refer to a registered user.
pub fn add_to_cart(
    product_id: ProductId,
    user_id: UserID,
    connection: &Connection,
) -> Result<CartLine, Error> {
    let product = get_product(product_id, connection).map_err(|error| match error {
        Error::NotFound => Error::ProductNotFound,
        error => error,
    })?;

    let line = CartLine::from(&product);

    connection
        .execute(
            "INSERT INTO cart_line (user_id, product_id, name, price, rating, image)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            (
                user_id.as_i64(),
                line.product_id,
                &line.name,
                line.price,
                line.rating,
                &line.image,
            ),
        )
        .map_err(|error| {
            tracing::warn!("Could not add product {product_id} to cart of user {user_id}: {error}");
            Error::UserUpdateFailed
        })?;

    Ok(line)
}

/// Remove every line for `product_id` from the user's cart.
///
/// Returns the number of lines removed. Removing a product that is not in the cart is not an
/// error.
pub fn remove_item(
    product_id: ProductId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM cart_line WHERE user_id = ?1 AND product_id = ?2;",
            (user_id.as_i64(), product_id),
        )
        .map_err(|error| {
            tracing::error!(
                "Could not remove product {product_id} from cart of user {user_id}: {error}"
            );
            Error::ItemRemovalFailed
        })
}

/// Get the lines in the user's cart along with their total price.
///
/// # Errors
///
/// Returns [Error::CartUnavailable] if `user_id` does not refer to a registered user.
pub fn get_cart(user_id: UserID, connection: &Connection) -> Result<Cart, Error> {
    if !user_exists(user_id, connection)? {
        return Err(Error::CartUnavailable);
    }

    let total = cart_total(user_id, connection)?;
    let lines = get_cart_lines(user_id, connection)?;

    Ok(Cart { total, lines })
}

/// The sum of the prices of the lines in the user's cart, zero if it is empty.
pub fn cart_total(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(price), 0) FROM cart_line WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0).and_then(|total| price_from_sql(0, total)),
        )
        .map_err(|error| error.into())
}

/// The lines in the user's cart in the order they were added.
pub fn get_cart_lines(user_id: UserID, connection: &Connection) -> Result<Vec<CartLine>, Error> {
    connection
        .prepare(
            "SELECT product_id, name, price, rating, image FROM cart_line
            WHERE user_id = ?1 ORDER BY id ASC;",
        )?
        .query_map([user_id.as_i64()], map_line_row)?
        .map(|maybe_line| maybe_line.map_err(|error| error.into()))
        .collect()
}

/// Turn the user's cart into an order paid for with cash on delivery and empty the cart.
///
/// Reading the cart, storing the order and clearing the cart happen in one transaction.
/// Concurrent checkouts for the same user are serialized, the later one sees an empty cart.
///
/// # Errors
///
/// Returns:
/// - [Error::CartUnavailable] if `user_id` does not refer to a registered user,
/// - [Error::EmptyCart] if there is nothing in the cart,
/// - [Error::CheckoutFailed] if any of the writes fail. Nothing is stored in this case.
pub fn checkout(user_id: UserID, connection: &Connection) -> Result<Order, Error> {
    let checkout_failed = |error: &dyn Display| {
        tracing::error!("Checkout for user {user_id} failed: {error}");
        Error::CheckoutFailed
    };

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)
        .map_err(|error| checkout_failed(&error))?;

    if !user_exists(user_id, &transaction).map_err(|error| checkout_failed(&error))? {
        return Err(Error::CartUnavailable);
    }

    let order_list =
        get_cart_lines(user_id, &transaction).map_err(|error| checkout_failed(&error))?;

    if order_list.is_empty() {
        return Err(Error::EmptyCart);
    }

    let price = cart_total(user_id, &transaction).map_err(|error| checkout_failed(&error))?;

    let order = insert_order(
        user_id,
        NewOrder {
            ordered_at: current_timestamp(),
            price,
            payment_method: PaymentMethod::CashOnDelivery,
            order_list,
        },
        &transaction,
    )
    .map_err(|error| checkout_failed(&error))?;

    transaction
        .execute(
            "DELETE FROM cart_line WHERE user_id = ?1;",
            [user_id.as_i64()],
        )
        .map_err(|error| checkout_failed(&error))?;

    transaction
        .commit()
        .map_err(|error| checkout_failed(&error))?;

    Ok(order)
}

/// Buy a single product straight away without going through the cart.
///
/// The order is priced from the catalog and the cart is left untouched.
///
/// # Errors
///
/// Returns:
/// - [Error::ProductNotFound] if `product_id` does not refer to a product,
/// - [Error::OrderUpdateFailed] if the order could not be stored, e.g. because `user_id` does not
///   refer to a registered user.
pub fn instant_buy(
    product_id: ProductId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Order, Error> {
    let product = get_product(product_id, connection).map_err(|error| match error {
        Error::NotFound => Error::ProductNotFound,
        error => error,
    })?;

    let order_update_failed = |error: rusqlite::Error| {
        tracing::error!("Instant buy of product {product_id} for user {user_id} failed: {error}");
        Error::OrderUpdateFailed
    };

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)
        .map_err(order_update_failed)?;

    let order = insert_order(
        user_id,
        NewOrder {
            ordered_at: current_timestamp(),
            price: u64::from(product.price),
            payment_method: PaymentMethod::CashOnDelivery,
            order_list: vec![CartLine::from(&product)],
        },
        &transaction,
    )
    .map_err(order_update_failed)?;

    transaction.commit().map_err(order_update_failed)?;

    Ok(order)
}

/// Store an order and its lines.
///
/// The caller is responsible for wrapping this in a transaction.
fn insert_order(
    user_id: UserID,
    order: NewOrder,
    connection: &Connection,
) -> Result<Order, rusqlite::Error> {
    connection.execute(
        "INSERT INTO customer_order (user_id, ordered_at, price, payment_method)
        VALUES (?1, ?2, ?3, ?4);",
        (
            user_id.as_i64(),
            order.ordered_at,
            price_to_sql(order.price)?,
            order.payment_method,
        ),
    )?;

    let order_id = connection.last_insert_rowid();

    let mut statement = connection.prepare(
        "INSERT INTO order_line (order_id, product_id, name, price, rating, image)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?;

    for line in &order.order_list {
        statement.execute((
            order_id,
            line.product_id,
            &line.name,
            line.price,
            line.rating,
            &line.image,
        ))?;
    }

    Ok(Order {
        id: order_id,
        ordered_at: order.ordered_at,
        price: order.price,
        payment_method: order.payment_method,
        order_list: order.order_list,
    })
}

/// Get the user's orders, oldest first, each with its lines.
///
/// # Errors
///
/// Returns [Error::CartUnavailable] if `user_id` does not refer to a registered user.
pub fn get_orders(user_id: UserID, connection: &Connection) -> Result<Vec<Order>, Error> {
    if !user_exists(user_id, connection)? {
        return Err(Error::CartUnavailable);
    }

    let headers = connection
        .prepare(
            "SELECT id, ordered_at, price, payment_method FROM customer_order
            WHERE user_id = ?1 ORDER BY id ASC;",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(Order {
                id: row.get(0)?,
                ordered_at: row.get(1)?,
                price: price_from_sql(2, row.get(2)?)?,
                payment_method: row.get(3)?,
                order_list: Vec::new(),
            })
        })?
        .collect::<Result<Vec<Order>, rusqlite::Error>>()?;

    let mut statement = connection.prepare(
        "SELECT product_id, name, price, rating, image FROM order_line
        WHERE order_id = ?1 ORDER BY id ASC;",
    )?;

    headers
        .into_iter()
        .map(|mut order| -> Result<Order, Error> {
            order.order_list = statement
                .query_map([order.id], map_line_row)?
                .collect::<Result<Vec<CartLine>, rusqlite::Error>>()?;

            Ok(order)
        })
        .collect()
}

/// Initialize the cart and order tables.
pub fn create_cart_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS cart_line (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            rating INTEGER NOT NULL,
            image TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_cart_line_user ON cart_line(user_id, product_id);

        CREATE TABLE IF NOT EXISTS customer_order (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            ordered_at TEXT NOT NULL,
            price INTEGER NOT NULL,
            payment_method TEXT NOT NULL
                CHECK (payment_method IN ('cash_on_delivery', 'digital')),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_customer_order_user ON customer_order(user_id);

        CREATE TABLE IF NOT EXISTS order_line (
            id INTEGER PRIMARY KEY,
            order_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            rating INTEGER NOT NULL,
            image TEXT NOT NULL,
            FOREIGN KEY(order_id) REFERENCES customer_order(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_order_line_order ON order_line(order_id);",
    )?;

    Ok(())
}

// Prices are stored as SQLite integers, which are signed.
fn price_from_sql(column: usize, price: i64) -> Result<u64, rusqlite::Error> {
    u64::try_from(price).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, price))
}

fn price_to_sql(price: u64) -> Result<i64, rusqlite::Error> {
    i64::try_from(price).map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

fn map_line_row(row: &Row) -> Result<CartLine, rusqlite::Error> {
    Ok(CartLine {
        product_id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        rating: row.get(3)?,
        image: row.get(4)?,
    })
}
