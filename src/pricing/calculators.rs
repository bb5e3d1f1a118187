//! Core pricing calculation functions.
//!
//! Pure functions for quote pricing math - no database access, no clock.
//! The same functions back quote creation, the public estimate endpoint and
//! the admin repricing preview, so those three can never disagree.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::{ParcelSize, PricingBreakdown};

/// Version tag stored alongside every priced quote.
pub const PRICING_VERSION: &str = "MANUAL-REVIEW";

/// Share of the item cost charged as the service fee.
pub const SERVICE_FEE_RATE: Decimal = dec!(0.12);

/// Flat surcharge for shipping to a remote postal region.
pub const REMOTE_SHIPPING_SURCHARGE: Decimal = dec!(8.50);

/// Sales tax is remitted by the marketplace, so quotes carry none.
pub const TAX_RATE: Decimal = Decimal::ZERO;

/// Largest item cost, reference price or shipping amount the engine accepts.
/// Anything above it is treated as unusable input.
pub const MAX_AMOUNT_CAD: Decimal = dec!(1_000_000);

/// Postal code prefixes for the territories (Nunavut/NWT and Yukon).
const REMOTE_POSTAL_PREFIXES: [char; 2] = ['X', 'Y'];

/// Truncate a currency amount down to whole cents.
///
/// This is a floor, not half-up rounding: 14.409 becomes 14.40 and -0.001
/// becomes -0.01.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use buyagent_web::pricing::floor_cents;
///
/// assert_eq!(floor_cents(dec!(14.409)), dec!(14.40));
/// assert_eq!(floor_cents(dec!(21.49)), dec!(21.49));
/// assert_eq!(floor_cents(dec!(0.999)), dec!(0.99));
/// ```
pub fn floor_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity)
}

/// Convert a CAD amount to integer cents for a payment line item.
///
/// Rounds half away from zero; amounts produced by the pricing engine are
/// already whole cents, so this only matters for hand-entered values.
/// `None` when the amount does not fit in cents.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn within_cap(price: &Decimal) -> bool {
    *price > Decimal::ZERO && *price <= MAX_AMOUNT_CAD
}

/// Accept a floating-point reference price only if it is finite, positive
/// and no more than [`MAX_AMOUNT_CAD`].
pub fn reference_price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64(value).filter(within_cap)
}

/// Numeric value of a reference price string, before any bounds check.
fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches('$').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// True when a submitted reference price is a number above [`MAX_AMOUNT_CAD`].
pub fn reference_price_over_cap(raw: &str) -> bool {
    parse_amount(raw).is_some_and(|value| value > MAX_AMOUNT_F64)
}

/// True when a submitted numeric reference price is above [`MAX_AMOUNT_CAD`].
pub fn reference_f64_over_cap(value: f64) -> bool {
    value > MAX_AMOUNT_F64
}

const MAX_AMOUNT_F64: f64 = 1_000_000.0;

/// Parse a free-form reference price from a form field.
///
/// Blank, unparsable, zero, negative and over-cap inputs all yield `None`.
pub fn parse_reference_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim().trim_start_matches('$').trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Decimal::from_str(trimmed)
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(reference_price_from_f64))?;

    within_cap(&parsed).then_some(parsed)
}

/// Whether a postal code routes to a remote region.
///
/// Only the first non-blank character is inspected, case-insensitively.
pub fn is_remote_postal_code(postal_code: &str) -> bool {
    postal_code
        .trim()
        .chars()
        .next()
        .map(|first| REMOTE_POSTAL_PREFIXES.contains(&first.to_ascii_uppercase()))
        .unwrap_or(false)
}

fn derive_item_cost(size: ParcelSize, reference_price: Option<Decimal>) -> Decimal {
    match reference_price {
        Some(price) if within_cap(&price) => floor_cents(price),
        _ => floor_cents(size.default_reference_price()),
    }
}

/// Service fee for a given item cost: a percentage, floored at the size minimum.
pub fn derive_service_fee(size: ParcelSize, item_cost: Decimal) -> Decimal {
    let calculated = item_cost * SERVICE_FEE_RATE;
    floor_cents(calculated.max(size.min_service_fee()))
}

fn derive_shipping(size: ParcelSize, postal_code: &str) -> Decimal {
    let surcharge = if is_remote_postal_code(postal_code) {
        REMOTE_SHIPPING_SURCHARGE
    } else {
        Decimal::ZERO
    };

    floor_cents(size.shipping_base() + surcharge)
}

/// Assemble the breakdown once item cost and shipping are known.
fn assemble(size: ParcelSize, item_cost_cad: Decimal, shipping_cad: Decimal) -> PricingBreakdown {
    let service_fee_cad = derive_service_fee(size, item_cost_cad);
    let tax_base = item_cost_cad + service_fee_cad + shipping_cad;
    let tax_cad = floor_cents(tax_base * TAX_RATE);
    let total_cad = floor_cents(item_cost_cad + service_fee_cad + shipping_cad + tax_cad);

    PricingBreakdown {
        item_cost_cad,
        service_fee_cad,
        shipping_cad,
        tax_cad,
        total_cad,
    }
}

/// Price a quote request.
///
/// Never fails: a missing or non-positive `reference_price` falls back to the
/// size default, and a blank postal code counts as not remote.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use buyagent_web::pricing::{calculate_pricing, ParcelSize};
///
/// let breakdown = calculate_pricing(ParcelSize::Medium, "M5V2T6", None);
/// assert_eq!(breakdown.service_fee_cad, dec!(14.40));
/// assert_eq!(breakdown.total_cad, dec!(150.39));
/// ```
pub fn calculate_pricing(
    size: ParcelSize,
    postal_code: &str,
    reference_price: Option<Decimal>,
) -> PricingBreakdown {
    let item_cost_cad = derive_item_cost(size, reference_price);
    let shipping_cad = derive_shipping(size, postal_code);

    assemble(size, item_cost_cad, shipping_cad)
}

/// Reprice a quote from admin-entered item cost and shipping.
///
/// The service fee, tax and total are always derived with the same rules as
/// [`calculate_pricing`]; admins only control the two inputs. Inputs are
/// clamped to `0..=MAX_AMOUNT_CAD`.
pub fn reprice_manual(size: ParcelSize, item_cost: Decimal, shipping: Decimal) -> PricingBreakdown {
    let item_cost_cad = floor_cents(item_cost.clamp(Decimal::ZERO, MAX_AMOUNT_CAD));
    let shipping_cad = floor_cents(shipping.clamp(Decimal::ZERO, MAX_AMOUNT_CAD));

    assemble(size, item_cost_cad, shipping_cad)
}
