//! Request DTOs for quote endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::pricing::requests::ReferencePriceInput;

use super::models::{OrderStatus, QuoteStatus};

/// Quote form as submitted by the customer.
///
/// Every field is optional at the serde level so that missing values come
/// back as field errors rather than a rejected body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuoteSubmission {
    pub product_urls: String,
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    pub email: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub reference_price: Option<ReferencePriceInput>,
    pub size: String,
}

/// Admin edit of a quote's pricing and status
#[derive(Debug, Deserialize)]
pub struct QuoteUpdateRequest {
    pub item_cost_cad: Decimal,
    pub shipping_cad: Decimal,
    pub status: QuoteStatus,
}

/// Admin repricing preview for a stored quote; its size is taken from the quote
#[derive(Debug, Deserialize)]
pub struct QuotePreviewRequest {
    pub item_cost_cad: Decimal,
    pub shipping_cad: Decimal,
}

/// Filters for the admin quote list
#[derive(Debug, Default, Deserialize)]
pub struct QuoteListQuery {
    #[serde(default)]
    pub status: Option<QuoteStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Admin change of an order's payment state
#[derive(Debug, Deserialize)]
pub struct OrderUpdateRequest {
    pub status: OrderStatus,
}

/// Filters for the admin order list
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

fn default_limit() -> i64 {
    50
}

pub const MAX_LIST_LIMIT: i64 = 100;

impl QuoteListQuery {
    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIST_LIMIT)
    }
}
