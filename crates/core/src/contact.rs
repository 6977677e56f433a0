//! Contact form validation.
//!
//! Every field is checked and all failures are reported together so the
//! form can show each message next to its input.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Minimum trimmed length of a sender name.
pub const MIN_NAME_CHARS: usize = 2;
/// Minimum trimmed length of a message body.
pub const MIN_MESSAGE_CHARS: usize = 10;
/// Maximum length of an email address (RFC 5321).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    /// Message shown under the field when it is invalid.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Name => "Name must be at least 2 characters",
            Self::Email => "Please enter a valid email",
            Self::Message => "Message must be at least 10 characters",
        }
    }
}

/// The set of fields that failed validation, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactErrors {
    fields: Vec<ContactField>,
}

impl ContactErrors {
    /// Validation message for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: ContactField) -> Option<&'static str> {
        self.fields.contains(&field).then(|| field.message())
    }

    #[must_use]
    pub fn fields(&self) -> &[ContactField] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ContactErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|field| field.message()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ContactErrors {}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Validate raw form input.
    ///
    /// Name and message are trimmed; the email is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns every field that failed validation.
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self, ContactErrors> {
        let name = name.trim();
        let email = email.trim().to_lowercase();
        let message = message.trim();

        let mut errors = ContactErrors::default();
        if name.chars().count() < MIN_NAME_CHARS {
            errors.fields.push(ContactField::Name);
        }
        if !is_valid_email(&email) {
            errors.fields.push(ContactField::Email);
        }
        if message.chars().count() < MIN_MESSAGE_CHARS {
            errors.fields.push(ContactField::Message);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name: name.to_owned(),
            email,
            message: message.to_owned(),
        })
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !host.starts_with('.')
}
