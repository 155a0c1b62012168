//! A per-user address book with a home and a work slot.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{AddressState, add_address_endpoint};
pub use db::{
    add_address, count_addresses, create_address_table, delete_addresses, edit_address,
    get_address_book, get_addresses,
};
pub use delete::delete_addresses_endpoint;
pub use domain::{Address, AddressForm, AddressSlot};
pub use edit::{edit_home_address_endpoint, edit_work_address_endpoint};
pub use list::list_addresses_endpoint;
