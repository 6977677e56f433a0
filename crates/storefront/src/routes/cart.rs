//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lives in the session; every mutation writes it back before the
//! response is rendered and fires `cart-updated` so the count badge re-reads
//! the stored cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use quickkart_core::{
    CartLineItem, CartStore, CloseReason, FetchState, LineKey, Price, ProductId, Quantity,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, instrument, warn};

use super::CART_UPDATED_EVENT;
use super::products::{ProductModalTemplate, QUANTITY_OPTIONS, SIZE_OPTIONS};
use super::selection::ModalClosedTemplate;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::session;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: String,
}

impl CartItemView {
    /// Variant as submitted back by the quantity controls.
    #[must_use]
    pub fn variant_value(&self) -> &str {
        self.variant.as_deref().unwrap_or_default()
    }

    /// Quantity after pressing "-" (zero removes the line).
    #[must_use]
    pub const fn decremented(&self) -> u32 {
        self.quantity.saturating_sub(1)
    }

    #[must_use]
    pub const fn incremented(&self) -> u32 {
        self.quantity.saturating_add(1)
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartStore::new())
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            variant: line.variant.clone(),
            quantity: line.quantity.get(),
            price: line.unit_price_display().display(),
            line_price: Price::usd(line.line_total()).display(),
            image_url: line.image_url.clone(),
        }
    }
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: Price::usd(cart.total_price()).display(),
            item_count: cart.total_item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<String>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Render the panel for a cart that was just changed.
fn updated_panel(cart: &CartStore) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartPanelTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Open the cart panel (HTMX).
#[instrument(skip(session))]
pub async fn panel(session: Session) -> Result<CartPanelTemplate> {
    let cart = session::load_cart(&session).await?;
    Ok(CartPanelTemplate {
        cart: CartView::from(&cart),
    })
}

/// Close the cart panel (HTMX).
///
/// A payment started from the panel does not outlive it.
#[instrument(skip(state, session))]
pub async fn close(State(state): State<AppState>, session: Session) -> Result<Html<&'static str>> {
    if let Some(payment_id) = session::take_pending_payment(&session).await?
        && state.payments().cancel(payment_id)
    {
        info!(%payment_id, "Pending payment cancelled by closing the cart");
    }
    Ok(Html(""))
}

/// Add item to cart (HTMX).
///
/// Copies the product's current title, price and image into the cart, then
/// closes the product modal. A catalog failure keeps the modal open with an
/// error in place of the form.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = Quantity::or_default(form.quantity)?;

    let product = match state.catalog().get_product(form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            warn!(product_id = %form.product_id, error = %e, "Failed to add item to cart");
            let selection = session::load_selection(&session).await?;
            return Ok(ProductModalTemplate {
                product: FetchState::Failed(e.user_message().to_string()),
                retry_id: e.is_retryable().then_some(form.product_id),
                quantity_options: &QUANTITY_OPTIONS,
                size_options: &SIZE_OPTIONS,
                scroll_locked: selection.scroll_locked(),
            }
            .into_response());
        }
    };

    let mut cart = session::load_cart(&session).await?;
    let change = cart.add_item(CartLineItem::from_product(
        &product,
        quantity,
        form.size.as_deref(),
    ));
    session::save_cart(&session, &cart).await?;

    let mut selection = session::load_selection(&session).await?;
    if let Some(product_id) = selection.close() {
        session::save_selection(&session, &selection).await?;
        debug!(
            %product_id,
            reason = CloseReason::AddedToCart.as_str(),
            "Product modal closed"
        );
    }

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product.id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );
    info!(
        product_id = %product.id,
        %quantity,
        size = form.size.as_deref().unwrap_or(""),
        ?change,
        total_items = cart.total_item_count(),
        "Item added to cart"
    );

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        ModalClosedTemplate {
            scroll_locked: selection.scroll_locked(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = session::load_cart(&session).await?;
    let key = LineKey::new(form.product_id, form.variant.as_deref());

    if !cart.set_quantity(&key, form.quantity) {
        debug!(product_id = %form.product_id, "Update for a line that is not in the cart");
        return Ok(CartPanelTemplate {
            cart: CartView::from(&cart),
        }
        .into_response());
    }

    session::save_cart(&session, &cart).await?;
    Ok(updated_panel(&cart))
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = session::load_cart(&session).await?;

    if cart
        .remove_item(form.product_id, form.variant.as_deref())
        .is_none()
    {
        return Ok(CartPanelTemplate {
            cart: CartView::from(&cart),
        }
        .into_response());
    }

    session::save_cart(&session, &cart).await?;
    add_breadcrumb(
        "cart",
        "Removed from cart",
        &[("product_id", form.product_id.to_string())],
    );
    Ok(updated_panel(&cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    let mut cart = session::load_cart(&session).await?;
    cart.clear();
    session::save_cart(&session, &cart).await?;
    Ok(updated_panel(&cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let cart = session::load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.total_item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: u32, price: Decimal, quantity: u32, variant: Option<&str>) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            unit_price: price,
            image_url: format!("https://img.example/{id}.jpg"),
            quantity: Quantity::new(quantity).unwrap(),
            variant: variant.map(str::to_owned),
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::new(999, 2), 3, None));
        cart.add_item(line(2, Decimal::new(1050, 2), 1, Some("M")));

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 4);
        assert_eq!(view.subtotal, "$40.47");
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].line_price, "$29.97");
        assert_eq!(view.items[1].variant_value(), "M");
        assert_eq!(view.items[0].variant_value(), "");
    }

    #[test]
    fn test_quantity_controls() {
        let item = CartItemView::from(&line(1, Decimal::ONE, 1, None));
        assert_eq!(item.decremented(), 0);
        assert_eq!(item.incremented(), 2);
    }

    #[test]
    fn test_empty_panel_has_no_pay_button() {
        let html = CartPanelTemplate {
            cart: CartView::empty(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Your cart is empty."));
        assert!(!html.contains("Proceed to Pay"));
    }

    #[test]
    fn test_panel_lists_lines_and_subtotal() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::new(999, 2), 3, None));

        let html = CartPanelTemplate {
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();
        assert!(html.contains("Product 1"));
        assert!(html.contains("Subtotal (3 items)"));
        assert!(html.contains("$29.97"));
        assert!(html.contains("Proceed to Pay"));
    }

    #[test]
    fn test_count_badge_hidden_when_empty() {
        let empty = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(empty.contains("id=\"cart-count\""));
        assert!(!empty.contains("is-visible"));

        let html = CartCountTemplate { count: 7 }.render().unwrap();
        assert!(html.contains(">7<"));
        assert!(html.contains("is-visible"));
    }
}
