//! Quote route handlers, public and admin.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::require_admin;
use crate::checkout;
use crate::error::Result;
use crate::forms::client_ip;
use crate::pricing::requests::check_manual_amounts;
use crate::pricing::responses::{PricingResponse, CURRENCY};
use crate::pricing::{reprice_manual, PRICING_VERSION};
use crate::AppState;

use super::models::{Order, Quote};
use super::queries;
use super::requests::{
    OrderListQuery, OrderUpdateRequest, QuoteListQuery, QuotePreviewRequest, QuoteSubmission,
    QuoteUpdateRequest, MAX_LIST_LIMIT,
};
use super::responses::{OrderDetail, QuoteSummary};
use super::services;

/// Public quote routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quotes", post(create))
        .route("/api/quotes/:id", get(show))
        .route("/api/quotes/:id/checkout", get(checkout::readiness))
}

/// Admin routes, all behind the bearer-token guard
pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/quotes", get(list))
        .route("/api/admin/quotes/:id", get(detail).put(update))
        .route("/api/admin/quotes/:id/preview", post(preview))
        .route(
            "/api/admin/pricing/preview",
            post(crate::pricing::routes::preview_manual),
        )
        .route("/api/admin/orders", get(orders))
        .route("/api/admin/orders/:id", get(order_detail).put(update_order))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// POST /api/quotes
async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<QuoteSubmission>,
) -> Result<(StatusCode, Json<QuoteSummary>)> {
    let ip = client_ip(&headers);
    let summary = services::submit_quote(&state, &ip, &submission).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/quotes/:id
async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<QuoteSummary>> {
    let summary = services::get_quote_summary(&state, id).await?;
    Ok(Json(summary.as_ref().clone()))
}

/// GET /api/admin/quotes
async fn list(
    State(state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<Vec<Quote>>> {
    let quotes = queries::list_quotes(&state.db, query.status, query.clamped_limit()).await?;
    Ok(Json(quotes))
}

/// GET /api/admin/quotes/:id
async fn detail(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Quote>> {
    Ok(Json(queries::get_quote(&state.db, id).await?))
}

/// PUT /api/admin/quotes/:id
async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuoteUpdateRequest>,
) -> Result<Json<Quote>> {
    Ok(Json(services::update_quote(&state, id, &request).await?))
}

/// POST /api/admin/quotes/:id/preview
async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuotePreviewRequest>,
) -> Result<Json<PricingResponse>> {
    check_manual_amounts(request.item_cost_cad, request.shipping_cad)?;

    let quote = queries::get_quote(&state.db, id).await?;
    let size = quote.parcel_size()?;

    Ok(Json(PricingResponse {
        size,
        currency: CURRENCY,
        pricing_version: PRICING_VERSION,
        breakdown: reprice_manual(size, request.item_cost_cad, request.shipping_cad),
    }))
}

/// GET /api/admin/orders
async fn orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = queries::list_orders(&state.db, query.status, MAX_LIST_LIMIT).await?;
    Ok(Json(orders))
}

/// GET /api/admin/orders/:id
async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(services::get_order_detail(&state, id).await?))
}

/// PUT /api/admin/orders/:id
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OrderUpdateRequest>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(services::update_order_status(&state, id, &request).await?))
}
