//! Contact form route handlers.
//!
//! Submissions are validated, held for a short simulated send, logged, and
//! acknowledged with a toast. Nothing is delivered anywhere.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use quickkart_core::{ContactErrors, ContactField, ContactMessage};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Contact form display data: submitted values plus per-field errors.
#[derive(Clone, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub message: String,
    pub name_error: Option<&'static str>,
    pub email_error: Option<&'static str>,
    pub message_error: Option<&'static str>,
}

impl ContactFormView {
    /// Re-render rejected input with its validation messages.
    #[must_use]
    pub fn rejected(form: ContactForm, errors: &ContactErrors) -> Self {
        Self {
            name: form.name,
            email: form.email,
            message: form.message,
            name_error: errors.message_for(ContactField::Name),
            email_error: errors.message_for(ContactField::Email),
            message_error: errors.message_for(ContactField::Message),
        }
    }
}

/// Contact form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFormTemplate {
    pub form: ContactFormView,
    pub sent: bool,
}

/// Submit the contact form.
///
/// On success the form comes back empty along with an out-of-band toast.
/// On failure it comes back with the submitted values and every field error.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> ContactFormTemplate {
    let message = match ContactMessage::parse(&form.name, &form.email, &form.message) {
        Ok(message) => message,
        Err(errors) => {
            debug!(%errors, "Contact form rejected");
            return ContactFormTemplate {
                form: ContactFormView::rejected(form, &errors),
                sent: false,
            };
        }
    };

    tokio::time::sleep(state.config().contact_delay).await;

    info!(
        name = %message.name,
        email = %message.email,
        length = message.message.chars().count(),
        "Contact message received"
    );

    ContactFormTemplate {
        form: ContactFormView::default(),
        sent: true,
    }
}
