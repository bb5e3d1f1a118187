//! Contact form intake.

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::emails::{build_contact_email, Addresses};
use crate::error::{AppError, FieldErrors, Result};
use crate::forms::{char_len, client_ip, escape_html, is_valid_email};
use crate::rate_limit::form_key;
use crate::AppState;

pub const CONTACT_THROTTLED: &str = "Too many messages. Please wait a minute and try again.";

const NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=80;
const MESSAGE_CHARS: std::ops::RangeInclusive<usize> = 10..=2000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Cleaned contact message; `message` is HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

pub fn validate_contact(submission: &ContactSubmission) -> std::result::Result<ContactMessage, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = submission.name.trim();
    if !NAME_CHARS.contains(&char_len(name)) {
        errors.insert(
            "name".to_string(),
            "Enter a name between 2 and 80 characters.".to_string(),
        );
    }

    let email = submission.email.trim();
    if !is_valid_email(email) {
        errors.insert("email".to_string(), "Use a valid email address.".to_string());
    }

    let message = submission.message.trim();
    if !MESSAGE_CHARS.contains(&char_len(message)) {
        errors.insert(
            "message".to_string(),
            "Write a message between 10 and 2000 characters.".to_string(),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ContactMessage {
        name: name.to_string(),
        email: email.to_string(),
        message: escape_html(message),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit))
}

/// POST /api/contact
async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<ContactResponse>> {
    let ip = client_ip(&headers);
    if !state.rate_limiter.consume(&form_key("contact", &ip)) {
        warn!(client = %ip, "Contact submission throttled");
        return Err(AppError::RateLimited(CONTACT_THROTTLED));
    }

    let contact = validate_contact(&submission).map_err(AppError::fields)?;

    let addresses = Addresses {
        from: &state.config.email_from,
        admin: &state.config.admin_email,
        site_url: &state.config.site_url,
    };
    let email = build_contact_email(addresses, &contact.name, &contact.email, &contact.message)?;
    state.mailer.send(email).await?;

    info!(from = %contact.email, "Contact message forwarded");
    Ok(Json(ContactResponse { success: true }))
}
