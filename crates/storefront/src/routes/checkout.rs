//! Simulated checkout handlers.
//!
//! "Proceed to Pay" starts a payment and answers with a toast that polls for
//! its own outcome. The toast disappears if the payment was cancelled.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::checkout::{PaymentId, PaymentStatus};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session;
use crate::state::AppState;

/// How often a processing toast asks for news.
pub const POLL_INTERVAL_MS: u64 = 500;

/// Payment toast fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/payment_toast.html")]
pub struct PaymentToastTemplate {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub poll_interval_ms: u64,
}

/// Start a simulated payment for the session's cart.
///
/// A payment already pending for this session is cancelled first. The cart
/// is left as it is.
#[instrument(skip(state, session))]
pub async fn pay(State(state): State<AppState>, session: Session) -> Result<PaymentToastTemplate> {
    let cart = session::load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    if let Some(previous) = session::take_pending_payment(&session).await? {
        state.payments().cancel(previous);
    }

    let payment_id = state.payments().start(state.config().payment_delay);
    session::set_pending_payment(&session, payment_id).await?;
    debug!(%payment_id, tracked = state.payments().tracked(), "Payment registered");

    add_breadcrumb(
        "checkout",
        "Payment started",
        &[
            ("payment_id", payment_id.to_string()),
            ("total", cart.total_price().to_string()),
        ],
    );

    Ok(PaymentToastTemplate {
        payment_id,
        status: PaymentStatus::Processing,
        poll_interval_ms: POLL_INTERVAL_MS,
    })
}

/// Report a payment's progress.
#[instrument(skip(state, session))]
pub async fn poll(
    State(state): State<AppState>,
    session: Session,
    Path(payment_id): Path<PaymentId>,
) -> Result<PaymentToastTemplate> {
    let status = state.payments().status(payment_id);

    if status.is_terminal() && session::pending_payment(&session).await? == Some(payment_id) {
        session::take_pending_payment(&session).await?;
    }
    debug!(%payment_id, ?status, "Payment polled");

    Ok(PaymentToastTemplate {
        payment_id,
        status,
        poll_interval_ms: POLL_INTERVAL_MS,
    })
}
