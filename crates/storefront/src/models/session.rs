//! Session-stored shopper state.
//!
//! Each browsing session owns exactly one cart and one selection. Handlers
//! load them through these helpers, mutate them, and store them back before
//! responding so the response always reflects the saved state.

use quickkart_core::{CartStore, Selection};
use tower_sessions::Session;

use crate::checkout::PaymentId;

/// Session keys for shopper data.
pub mod keys {
    /// Key for the session's cart.
    pub const CART: &str = "cart";

    /// Key for the product open in the detail view.
    pub const SELECTION: &str = "selection";

    /// Key for the payment started from the cart panel, if any.
    pub const PENDING_PAYMENT: &str = "pending_payment";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Load the session's cart, or an empty cart for a fresh session.
pub async fn load_cart(session: &Session) -> SessionResult<CartStore> {
    Ok(session.get::<CartStore>(keys::CART).await?.unwrap_or_default())
}

/// Store the session's cart.
pub async fn save_cart(session: &Session, cart: &CartStore) -> SessionResult<()> {
    session.insert(keys::CART, cart).await
}

/// Load the session's selection (`Closed` for a fresh session).
pub async fn load_selection(session: &Session) -> SessionResult<Selection> {
    Ok(session
        .get::<Selection>(keys::SELECTION)
        .await?
        .unwrap_or_default())
}

/// Store the session's selection.
pub async fn save_selection(session: &Session, selection: &Selection) -> SessionResult<()> {
    session.insert(keys::SELECTION, selection).await
}

/// The payment started from this session's cart panel, if any.
pub async fn pending_payment(session: &Session) -> SessionResult<Option<PaymentId>> {
    session.get::<PaymentId>(keys::PENDING_PAYMENT).await
}

pub async fn set_pending_payment(session: &Session, id: PaymentId) -> SessionResult<()> {
    session.insert(keys::PENDING_PAYMENT, id).await
}

/// Forget the pending payment, returning it.
pub async fn take_pending_payment(session: &Session) -> SessionResult<Option<PaymentId>> {
    session.remove::<PaymentId>(keys::PENDING_PAYMENT).await
}

/// Start a new browsing session: empty cart, nothing selected.
///
/// Returns the payment that was pending in the previous page view, if any,
/// so the caller can cancel it.
pub async fn reset(session: &Session) -> SessionResult<Option<PaymentId>> {
    save_cart(session, &CartStore::new()).await?;
    save_selection(session, &Selection::Closed).await?;
    take_pending_payment(session).await
}
