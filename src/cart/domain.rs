//! Cart lines, orders and the query parameters of the cart endpoints.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    product::{Product, ProductId},
    user::UserID,
};

/// A copy of a product as it was when it was put in a cart or bought.
///
/// Later changes to the catalog do not affect existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: u32,
    pub rating: u8,
    pub image: String,
}

impl From<&Product> for CartLine {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            rating: product.rating,
            image: product.image.clone(),
        }
    }
}

/// How an order is paid for.
///
/// Only cash on delivery is used when placing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Digital,
}

impl PaymentMethod {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Digital => "digital",
        }
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, rusqlite::Error> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "digital" => Ok(PaymentMethod::Digital),
            other => Err(FromSqlError::Other(
                format!("unknown payment method {other:?}").into(),
            )),
        }
    }
}

/// Database identifier for an order.
pub type OrderId = i64;

/// A placed order together with the lines that were bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(with = "time::serde::rfc3339")]
    pub ordered_at: OffsetDateTime,
    /// The sum of the line prices.
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub order_list: Vec<CartLine>,
}

/// An order that has been fully built but not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub ordered_at: OffsetDateTime,
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub order_list: Vec<CartLine>,
}

/// The contents of a user's cart and their total price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub total: u64,
    pub lines: Vec<CartLine>,
}

/// Query parameters for adding to and removing from a cart, e.g. `?id=3&userID=1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartItemQuery {
    /// The product ID.
    pub id: ProductId,
    #[serde(rename = "userID")]
    pub user_id: UserID,
}

/// Query parameters for buying a single product, e.g. `?userid=1&pid=3`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InstantBuyQuery {
    #[serde(rename = "userid")]
    pub user_id: UserID,
    #[serde(rename = "pid")]
    pub product_id: ProductId,
}

#[cfg(test)]
mod payment_method_tests {
    use rusqlite::Connection;

    use super::PaymentMethod;

    #[test]
    fn payment_method_survives_database() {
        let connection = Connection::open_in_memory().unwrap();

        for method in [PaymentMethod::CashOnDelivery, PaymentMethod::Digital] {
            let got: PaymentMethod = connection
                .query_row("SELECT ?1", [method], |row| row.get(0))
                .unwrap();

            assert_eq!(got, method);
        }
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let connection = Connection::open_in_memory().unwrap();

        let result = connection.query_row("SELECT 'cheque'", [], |row| {
            row.get::<_, PaymentMethod>(0)
        });

        assert!(result.is_err());
    }

    #[test]
    fn payment_method_serializes_as_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();

        assert_eq!(json, "\"cash_on_delivery\"");
    }
}
