//! Quote form validation and normalisation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldErrors;
use crate::forms::{char_len, escape_html, is_valid_email, non_blank};
use crate::pricing::{floor_cents, ParcelSize};

use super::models::NewQuote;
use super::requests::QuoteSubmission;

pub const MAX_NOTES_CHARS: usize = 1500;

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\d[A-Z]\s?\d[A-Z]\d$").expect("valid postal code regex"));

static PRODUCT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+\.[^\s/?#]+(?:[/?#]\S*)?$").expect("valid url regex"));

/// Split a pasted list of product links on newlines, commas and semicolons.
pub fn split_product_urls(value: &str) -> Vec<String> {
    value
        .split(['\n', '\r', ',', ';'])
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Storage form of a product link list: one per line, `None` when empty.
pub fn join_product_urls(urls: &[String]) -> Option<String> {
    if urls.is_empty() {
        None
    } else {
        Some(urls.join("\n"))
    }
}

pub fn is_valid_product_url(url: &str) -> bool {
    PRODUCT_URL_RE.is_match(url)
}

pub fn normalize_postal_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Canadian postal code, e.g. `M5V 2T6` or `M5V2T6`. Expects normalised input.
pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE_RE.is_match(value)
}

/// Trim, HTML-escape and cap free-form notes. Blank notes become `None`.
pub fn sanitize_notes(notes: &str) -> Option<String> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(escape_html(trimmed).chars().take(MAX_NOTES_CHARS).collect())
}

fn require_min(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if char_len(trimmed) < min {
        errors.insert(field.to_string(), message.to_string());
    }
    trimmed.to_string()
}

/// Validate a submitted quote form.
///
/// All problems are collected, keyed by field name, so the form can
/// highlight every one of them at once.
pub fn validate_quote(submission: &QuoteSubmission) -> Result<NewQuote, FieldErrors> {
    let mut errors = FieldErrors::new();

    let product_urls = split_product_urls(&submission.product_urls);
    if !product_urls.iter().all(|url| is_valid_product_url(url)) {
        errors.insert(
            "product_urls".to_string(),
            "Please enter valid Taobao/Tmall URLs separated by new lines or commas.".to_string(),
        );
    }

    let recipient_name = require_min(
        &mut errors,
        "recipient_name",
        &submission.recipient_name,
        2,
        "Enter the recipient name.",
    );
    let address_line1 = require_min(
        &mut errors,
        "address_line1",
        &submission.address_line1,
        5,
        "Enter the street address.",
    );
    let city = require_min(&mut errors, "city", &submission.city, 2, "Enter a city.");
    let province = require_min(
        &mut errors,
        "province",
        &submission.province,
        2,
        "Enter a province or territory.",
    )
    .to_uppercase();
    let address_line2 = non_blank(submission.address_line2.as_deref());

    let email = submission.email.trim().to_string();
    if !is_valid_email(&email) {
        errors.insert("email".to_string(), "Use a valid email address.".to_string());
    }

    let postal_code = normalize_postal_code(&submission.postal_code);
    if !is_valid_postal_code(&postal_code) {
        errors.insert(
            "postal_code".to_string(),
            "Enter a valid Canadian postal code (e.g. M5V 2T6).".to_string(),
        );
    }

    let raw_notes = submission.notes.as_deref().unwrap_or_default();
    if char_len(raw_notes) > MAX_NOTES_CHARS {
        errors.insert(
            "notes".to_string(),
            "Notes must be 1500 characters or less.".to_string(),
        );
    }

    let size = submission.size.parse::<ParcelSize>();
    if size.is_err() {
        errors.insert("size".to_string(), "Choose a parcel size.".to_string());
    }

    if submission
        .reference_price
        .as_ref()
        .is_some_and(|price| price.is_over_cap())
    {
        errors.insert(
            "reference_price".to_string(),
            "Reference price must be no more than $1,000,000.00.".to_string(),
        );
    }
    let reference_price = submission
        .reference_price
        .as_ref()
        .and_then(|price| price.to_decimal())
        .map(floor_cents);

    match size {
        Ok(size) if errors.is_empty() => Ok(NewQuote {
            email,
            product_urls,
            recipient_name,
            address_line1,
            address_line2,
            city,
            province,
            postal_code,
            notes: sanitize_notes(raw_notes),
            size,
            reference_price,
        }),
        _ => Err(errors),
    }
}
