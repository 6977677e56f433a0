//! Product modal selection handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use quickkart_core::CloseReason;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::session;

/// Close modal form data.
#[derive(Debug, Deserialize)]
pub struct CloseForm {
    pub reason: CloseReason,
}

/// Empty modal fragment template (for HTMX).
///
/// Clears `#product-modal` and releases the scroll lock out of band.
#[derive(Template, WebTemplate)]
#[template(path = "partials/modal_closed.html")]
pub struct ModalClosedTemplate {
    pub scroll_locked: bool,
}

/// Close the product modal.
#[instrument(skip(session))]
pub async fn close(session: Session, Form(form): Form<CloseForm>) -> Result<ModalClosedTemplate> {
    let mut selection = session::load_selection(&session).await?;
    if let Some(product_id) = selection.close() {
        session::save_selection(&session, &selection).await?;
        debug!(%product_id, reason = form.reason.as_str(), "Product modal closed");
    }

    Ok(ModalClosedTemplate {
        scroll_locked: selection.scroll_locked(),
    })
}
