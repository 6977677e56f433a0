//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use quickkart_core::FetchState;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::contact::ContactFormView;
use super::products::ProductView;
use crate::error::Result;
use crate::filters;
use crate::models::session;
use crate::state::AppState;

/// Home page template.
///
/// The grid starts in its loading state and fetches itself once the page is
/// in the browser.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: FetchState<Vec<ProductView>>,
    pub count: u64,
    pub form: ContactFormView,
    pub sent: bool,
    pub scroll_locked: bool,
}

/// Display home page.
///
/// Loading the page starts a new browsing session: the cart is emptied, the
/// modal is closed and a payment left pending by the previous page view is
/// cancelled.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    if let Some(payment_id) = session::reset(&session).await?
        && state.payments().cancel(payment_id)
    {
        info!(%payment_id, "Pending payment cancelled by page load");
    }

    Ok(HomeTemplate {
        products: FetchState::Loading,
        count: 0,
        form: ContactFormView::default(),
        sent: false,
        scroll_locked: false,
    })
}
