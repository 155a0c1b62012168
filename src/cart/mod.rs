//! Shopping carts, checkout and order history.

mod checkout;
mod db;
mod domain;
mod items;
mod list;

pub use checkout::{checkout_endpoint, instant_buy_endpoint};
pub use db::{
    add_to_cart, cart_total, checkout, create_cart_tables, get_cart, get_cart_lines, get_orders,
    instant_buy, remove_item,
};
pub use domain::{Cart, CartItemQuery, CartLine, InstantBuyQuery, NewOrder, Order, PaymentMethod};
pub use items::{CartState, add_to_cart_endpoint, remove_item_endpoint};
pub use list::{list_cart_endpoint, list_orders_endpoint};
