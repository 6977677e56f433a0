//! HTTP route handlers for the storefront.
//!
//! Every handler runs one shopper action to completion and answers with the
//! HTML that changed. Fragments are swapped in by HTMX.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (starts a fresh browsing session)
//! GET  /health                    - Health check
//!
//! # Products
//! GET  /products/grid             - Catalog grid fragment (ready / empty / error + retry)
//! GET  /products/{id}/quick-view  - Select a product, return the modal fragment
//! POST /selection/close           - Close the modal (reason form field)
//!
//! # Cart (HTMX fragments)
//! GET  /cart/panel                - Cart panel fragment
//! POST /cart/close                - Close the panel, cancel any pending payment
//! POST /cart/add                  - Add to cart (closes the modal, triggers cart-updated)
//! POST /cart/update               - Set a line's quantity (0 removes)
//! POST /cart/remove               - Remove a line
//! POST /cart/clear                - Empty the cart
//! GET  /cart/count                - Cart count badge fragment
//!
//! # Checkout
//! POST /checkout/pay              - Start a simulated payment (toast fragment)
//! GET  /checkout/pay/{id}         - Poll a payment (toast fragment)
//!
//! # Contact
//! POST /contact                   - Contact form submission
//! ```

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod products;
pub mod selection;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Name of the HTMX event fired after every cart mutation.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/grid", get(products::grid))
        .route("/{id}/quick-view", get(products::quick_view))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/panel", get(cart::panel))
        .route("/close", post(cart::close))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/pay", post(checkout::pay))
        .route("/pay/{id}", get(checkout::poll))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        .route("/selection/close", post(selection::close))
        // Cart routes
        .nest("/cart", cart_routes())
        // Simulated checkout
        .nest("/checkout", checkout_routes())
        // Contact form
        .route("/contact", post(contact::submit))
}
