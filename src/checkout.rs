//! Checkout readiness for a quote.
//!
//! Decides whether a quote can be paid and, if so, which single line item a
//! hosted payment session should charge. Session creation happens elsewhere.

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::calculators::to_minor_units;
use crate::quotes::models::QuoteStatus;
use crate::quotes::responses::QuoteSummary;
use crate::quotes::services::get_quote_summary;
use crate::AppState;

pub const CHECKOUT_CURRENCY: &str = "cad";

const CANCELLED: &str =
    "This quote has been cancelled. Submit a new quote request to continue.";
const NOT_PAYABLE: &str =
    "This quote does not have a payable total yet. We will email you once it is ready.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub currency: &'static str,
    /// Amount in cents
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CheckoutReadiness {
    AlreadyPaid { already_paid: bool },
    Ready {
        quote_id: Uuid,
        email: String,
        line_items: Vec<CheckoutLineItem>,
    },
}

/// Whether `quote` can go to payment.
pub fn assess_checkout(quote: &QuoteSummary) -> Result<CheckoutReadiness> {
    match quote.status {
        QuoteStatus::Cancelled => return Err(AppError::Conflict(CANCELLED.to_string())),
        QuoteStatus::Paid => return Ok(CheckoutReadiness::AlreadyPaid { already_paid: true }),
        _ => {}
    }

    let total = quote.breakdown.total_cad;
    if total <= Decimal::ZERO {
        return Err(AppError::Conflict(NOT_PAYABLE.to_string()));
    }

    let unit_amount = to_minor_units(total).ok_or_else(|| {
        AppError::Internal(format!("quote {} total {} does not fit in cents", quote.id, total))
    })?;

    Ok(CheckoutReadiness::Ready {
        quote_id: quote.id,
        email: quote.email.clone(),
        line_items: vec![CheckoutLineItem {
            name: format!("Quote {}", quote.id),
            currency: CHECKOUT_CURRENCY,
            unit_amount,
            quantity: 1,
        }],
    })
}

/// GET /api/quotes/:id/checkout
pub async fn readiness(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutReadiness>> {
    let quote = get_quote_summary(&state, id).await?;
    let readiness = assess_checkout(&quote)?;
    tracing::debug!(quote_id = %id, "Checkout readiness: {:?}", readiness);
    Ok(Json(readiness))
}
