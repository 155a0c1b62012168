//! The API endpoints URIs.
//!
//! Identifiers are passed as query parameters, e.g. `/cart/list?id=1`.

/// The route for creating a user account.
pub const SIGN_UP: &str = "/users/signup";
/// The route for logging in a user.
pub const LOG_IN: &str = "/users/login";
/// The route for listing the whole catalog.
pub const PRODUCT_VIEW: &str = "/users/productview";
/// The route for searching the catalog by product name.
pub const SEARCH: &str = "/users/search";
/// The route for adding a product to the catalog.
pub const ADD_PRODUCT: &str = "/admin/products/add";

/// The route for adding a product to a cart.
pub const CART_ADD: &str = "/cart/add";
/// The route for removing a product from a cart.
pub const CART_REMOVE: &str = "/cart/remove";
/// The route for listing a cart and its total.
pub const CART_LIST: &str = "/cart/list";
/// The route for checking out a cart.
pub const CART_CHECKOUT: &str = "/cart/checkout";
/// The route for buying a single product without the cart.
pub const CART_BUY: &str = "/cart/buy";
/// The route for listing a user's orders.
pub const CART_ORDERS: &str = "/cart/orders";

/// The route for listing a user's addresses.
pub const ADDRESS_LIST: &str = "/address/list";
/// The route for adding an address.
pub const ADDRESS_ADD: &str = "/address/add";
/// The route for overwriting the home address.
pub const ADDRESS_EDIT_HOME: &str = "/address/edit/home";
/// The route for overwriting the work address.
pub const ADDRESS_EDIT_WORK: &str = "/address/edit/work";
/// The route for deleting every address of a user.
pub const ADDRESS_DELETE: &str = "/address/delete";
