//! Quote workflows: intake, lookup, admin repricing and order status.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::emails::{build_quote_emails, Addresses};
use crate::error::{AppError, Result};
use crate::pricing::requests::check_manual_amounts;
use crate::pricing::{calculate_pricing, reprice_manual, PricingBreakdown};
use crate::rate_limit::form_key;
use crate::AppState;

use super::models::{OrderStatus, Quote, QuoteStatus};
use super::queries;
use super::requests::{OrderUpdateRequest, QuoteSubmission, QuoteUpdateRequest};
use super::responses::{FieldChange, OrderDetail, QuoteSummary};
use super::validation::validate_quote;

pub const QUOTE_THROTTLED: &str = "Too many quote attempts. Please wait a minute and try again.";

/// Throttle, validate, price, persist and announce a new quote request.
pub async fn submit_quote(
    state: &AppState,
    client_ip: &str,
    submission: &QuoteSubmission,
) -> Result<QuoteSummary> {
    let key = form_key("quote", client_ip);
    if !state.rate_limiter.consume(&key) {
        warn!(client = %client_ip, "Quote submission throttled");
        return Err(AppError::RateLimited(QUOTE_THROTTLED));
    }
    debug!(client = %client_ip, remaining = state.rate_limiter.remaining(&key), "Quote attempt");

    let quote = validate_quote(submission).map_err(AppError::fields)?;

    let breakdown = calculate_pricing(quote.size, &quote.postal_code, quote.reference_price);
    let stored =
        queries::insert_quote(&state.db, Uuid::new_v4(), &quote, &breakdown, QuoteStatus::Sent)
            .await?;
    let summary = QuoteSummary::try_from(&stored)?;

    info!(
        quote_id = %summary.id,
        size = %quote.size,
        total = %breakdown.total_cad,
        "Quote request stored"
    );

    let addresses = Addresses {
        from: &state.config.email_from,
        admin: &state.config.admin_email,
        site_url: &state.config.site_url,
    };
    let (customer, admin) = build_quote_emails(addresses, &quote, &summary)?;
    for email in [customer, admin] {
        if let Err(e) = state.mailer.send(email).await {
            warn!(quote_id = %summary.id, "Failed to send quote email: {}", e);
        }
    }

    Ok(summary)
}

/// Public summary for a quote, served from cache when possible.
pub async fn get_quote_summary(state: &AppState, id: Uuid) -> Result<Arc<QuoteSummary>> {
    if let Some(cached) = state.cache.quotes.get(&id).await {
        debug!("Cache HIT for quote: {}", id);
        return Ok(cached);
    }
    debug!("Cache MISS for quote: {}", id);

    let quote = queries::get_quote(&state.db, id).await?;
    let summary = Arc::new(QuoteSummary::try_from(&quote)?);
    state.cache.quotes.insert(id, summary.clone()).await;

    Ok(summary)
}

/// Field-by-field diff between the stored quote and its edit.
pub fn quote_changes(
    quote: &Quote,
    next: &PricingBreakdown,
    next_status: QuoteStatus,
) -> BTreeMap<String, FieldChange> {
    let current = quote.breakdown();
    let mut changes = BTreeMap::new();

    let mut record = |field: &str, before: String, after: String| {
        if before != after {
            changes.insert(field.to_string(), FieldChange { before, after });
        }
    };

    let money = [
        ("item_cost_cad", current.item_cost_cad, next.item_cost_cad),
        ("service_fee_cad", current.service_fee_cad, next.service_fee_cad),
        ("shipping_cad", current.shipping_cad, next.shipping_cad),
        ("tax_cad", current.tax_cad, next.tax_cad),
        ("total_cad", current.total_cad, next.total_cad),
    ];
    for (field, before, after) in money {
        // Compare numerically so 120 and 120.00 are not a change.
        if before != after {
            record(field, before.to_string(), after.to_string());
        }
    }
    record("status", quote.status.clone(), next_status.as_str().to_string());

    changes
}

/// Reprice a quote from admin-entered amounts and record what changed.
pub async fn update_quote(state: &AppState, id: Uuid, request: &QuoteUpdateRequest) -> Result<Quote> {
    check_manual_amounts(request.item_cost_cad, request.shipping_cad)?;

    let mut tx = state.db.begin().await?;
    let quote = queries::get_quote_for_update(&mut *tx, id).await?;
    let breakdown = reprice_manual(quote.parcel_size()?, request.item_cost_cad, request.shipping_cad);
    let changes = quote_changes(&quote, &breakdown, request.status);

    if changes.is_empty() {
        debug!("No changes for quote: {}", id);
        return Ok(quote);
    }

    let diff = serde_json::to_value(&changes).map_err(|e| AppError::Internal(e.to_string()))?;
    let updated = queries::update_quote_pricing(&mut *tx, id, &breakdown, request.status).await?;
    queries::insert_quote_audit(&mut *tx, id, &state.config.admin_email, diff).await?;
    tx.commit().await?;
    state.cache.invalidate_quote(id).await;

    info!(
        quote_id = %id,
        fields = changes.len(),
        total = %updated.total_cad,
        "Quote updated by admin"
    );

    Ok(updated)
}

/// Quote status an order update implies: a newly paid order marks its
/// quote paid. `None` when the quote is left alone.
pub fn quote_status_after_order_update(
    order_status: OrderStatus,
    quote_status: QuoteStatus,
) -> Option<QuoteStatus> {
    (order_status == OrderStatus::Paid && quote_status != QuoteStatus::Paid)
        .then_some(QuoteStatus::Paid)
}

/// Order with its quote, for the admin order screen.
pub async fn get_order_detail(state: &AppState, id: Uuid) -> Result<OrderDetail> {
    let order = queries::get_order(&state.db, id).await?;
    let quote = queries::get_quote(&state.db, order.quote_id).await?;
    Ok(OrderDetail { order, quote })
}

/// Change an order's status, marking its quote paid in the same
/// transaction when the order becomes paid.
pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    request: &OrderUpdateRequest,
) -> Result<OrderDetail> {
    let mut tx = state.db.begin().await?;
    let order = queries::get_order_for_update(&mut *tx, id).await?;
    let mut quote = queries::get_quote_for_update(&mut *tx, order.quote_id).await?;
    let order = queries::update_order_status(&mut *tx, id, request.status).await?;

    let next_quote_status = quote_status_after_order_update(request.status, quote.quote_status()?);
    if let Some(next) = next_quote_status {
        let changes = BTreeMap::from([(
            "status".to_string(),
            FieldChange {
                before: quote.status.clone(),
                after: next.as_str().to_string(),
            },
        )]);
        let diff = serde_json::to_value(&changes).map_err(|e| AppError::Internal(e.to_string()))?;

        queries::update_quote_status(&mut *tx, quote.id, next).await?;
        queries::insert_quote_audit(&mut *tx, quote.id, &state.config.admin_email, diff).await?;
        quote.status = next.as_str().to_string();
    }
    tx.commit().await?;

    if next_quote_status.is_some() {
        state.cache.invalidate_quote(quote.id).await;
    }

    info!(
        order_id = %id,
        quote_id = %quote.id,
        status = request.status.as_str(),
        quote_marked_paid = next_quote_status.is_some(),
        "Order status updated by admin"
    );

    Ok(OrderDetail { order, quote })
}
