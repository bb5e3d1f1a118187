//! HTTP handlers for pricing estimates.

use axum::{routing::post, Json, Router};

use crate::error::Result;
use crate::AppState;

use super::calculators::{calculate_pricing, reprice_manual, PRICING_VERSION};
use super::requests::{check_manual_amounts, EstimatePricingRequest, ManualPricingRequest};
use super::responses::{PricingResponse, CURRENCY};

/// Public pricing routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/pricing/estimate", post(estimate))
}

/// Live estimate for the quote form; nothing is persisted.
async fn estimate(Json(request): Json<EstimatePricingRequest>) -> Json<PricingResponse> {
    let reference_price = request
        .reference_price
        .as_ref()
        .and_then(|price| price.to_decimal());

    let breakdown = calculate_pricing(request.size, &request.postal_code, reference_price);
    tracing::debug!(
        size = %request.size,
        total = %breakdown.total_cad,
        "Pricing estimate"
    );

    Json(PricingResponse {
        size: request.size,
        currency: CURRENCY,
        pricing_version: PRICING_VERSION,
        breakdown,
    })
}

/// Admin repricing preview, mounted under the admin router.
pub async fn preview_manual(
    Json(request): Json<ManualPricingRequest>,
) -> Result<Json<PricingResponse>> {
    check_manual_amounts(request.item_cost_cad, request.shipping_cad)?;

    let breakdown = reprice_manual(request.size, request.item_cost_cad, request.shipping_cad);

    Ok(Json(PricingResponse {
        size: request.size,
        currency: CURRENCY,
        pricing_version: PRICING_VERSION,
        breakdown,
    }))
}
