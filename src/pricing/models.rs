//! Value types for quote pricing.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Coarse parcel size used to pick fee and shipping defaults.
///
/// Every size-indexed table below is an exhaustive `match`, so adding a
/// variant will not compile until all three tables are updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParcelSize {
    Small,
    Medium,
    Large,
}

impl ParcelSize {
    pub const ALL: [ParcelSize; 3] = [ParcelSize::Small, ParcelSize::Medium, ParcelSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelSize::Small => "SMALL",
            ParcelSize::Medium => "MEDIUM",
            ParcelSize::Large => "LARGE",
        }
    }

    /// Item cost assumed when the customer gives no usable reference price.
    pub fn default_reference_price(&self) -> Decimal {
        match self {
            ParcelSize::Small => dec!(75),
            ParcelSize::Medium => dec!(120),
            ParcelSize::Large => dec!(220),
        }
    }

    /// Lower bound on the service fee.
    pub fn min_service_fee(&self) -> Decimal {
        match self {
            ParcelSize::Small => dec!(9),
            ParcelSize::Medium => dec!(14),
            ParcelSize::Large => dec!(26),
        }
    }

    /// Shipping before any remote-region surcharge.
    pub fn shipping_base(&self) -> Decimal {
        match self {
            ParcelSize::Small => dec!(12.99),
            ParcelSize::Medium => dec!(15.99),
            ParcelSize::Large => dec!(24.99),
        }
    }
}

impl fmt::Display for ParcelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parcel size '{0}'")]
pub struct UnknownParcelSize(pub String);

impl FromStr for ParcelSize {
    type Err = UnknownParcelSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMALL" => Ok(ParcelSize::Small),
            "MEDIUM" => Ok(ParcelSize::Medium),
            "LARGE" => Ok(ParcelSize::Large),
            _ => Err(UnknownParcelSize(s.to_string())),
        }
    }
}

/// Five-field CAD breakdown of a quote.
///
/// All amounts are floored to the cent and `total_cad` is always the sum of
/// the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub item_cost_cad: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee_cad: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub shipping_cad: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_cad: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cad: Decimal,
}

impl PricingBreakdown {
    /// Breakdown used before a quote has been priced.
    pub const ZERO: PricingBreakdown = PricingBreakdown {
        item_cost_cad: Decimal::ZERO,
        service_fee_cad: Decimal::ZERO,
        shipping_cad: Decimal::ZERO,
        tax_cad: Decimal::ZERO,
        total_cad: Decimal::ZERO,
    };
}
