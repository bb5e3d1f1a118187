//! Response DTOs for pricing API endpoints.

use serde::Serialize;

use super::models::{ParcelSize, PricingBreakdown};

/// Currency every quote is priced in.
pub const CURRENCY: &str = "CAD";

/// Response for a pricing estimate or repricing preview
#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub size: ParcelSize,
    pub currency: &'static str,
    pub pricing_version: &'static str,
    #[serde(flatten)]
    pub breakdown: PricingBreakdown,
}
