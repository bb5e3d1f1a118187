//! Request DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, FieldErrors};

use super::calculators::{
    parse_reference_price, reference_f64_over_cap, reference_price_from_f64,
    reference_price_over_cap, MAX_AMOUNT_CAD,
};
use super::models::ParcelSize;

/// Customer-declared reference price, as a JSON number or a raw form string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferencePriceInput {
    Number(f64),
    Text(String),
}

impl ReferencePriceInput {
    /// Usable positive price, or `None` so the size default applies.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            ReferencePriceInput::Number(value) => reference_price_from_f64(*value),
            ReferencePriceInput::Text(raw) => parse_reference_price(raw),
        }
    }

    /// A number was given but it is above the accepted maximum.
    pub fn is_over_cap(&self) -> bool {
        match self {
            ReferencePriceInput::Number(value) => reference_f64_over_cap(*value),
            ReferencePriceInput::Text(raw) => reference_price_over_cap(raw),
        }
    }
}

pub const NON_NEGATIVE: &str = "Must be a valid non-negative number.";
pub const OVER_CAP: &str = "Must be no more than $1,000,000.00.";

/// Validate admin-entered item cost and shipping, keyed by field.
pub fn check_manual_amounts(item_cost_cad: Decimal, shipping_cad: Decimal) -> Result<(), AppError> {
    let mut field_errors = FieldErrors::new();
    for (field, amount) in [("item_cost_cad", item_cost_cad), ("shipping_cad", shipping_cad)] {
        if amount < Decimal::ZERO {
            field_errors.insert(field.to_string(), NON_NEGATIVE.to_string());
        } else if amount > MAX_AMOUNT_CAD {
            field_errors.insert(field.to_string(), OVER_CAP.to_string());
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::fields(field_errors))
    }
}

/// Request to estimate pricing for a prospective quote
#[derive(Debug, Deserialize)]
pub struct EstimatePricingRequest {
    pub size: ParcelSize,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub reference_price: Option<ReferencePriceInput>,
}

/// Request to preview an admin repricing before saving it
#[derive(Debug, Deserialize)]
pub struct ManualPricingRequest {
    pub size: ParcelSize,
    pub item_cost_cad: Decimal,
    pub shipping_cad: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_price_accepts_number_or_string() {
        let req: EstimatePricingRequest = serde_json::from_str(
            r#"{"size":"SMALL","postal_code":"X0A0H0","reference_price":40}"#,
        )
        .unwrap();
        assert_eq!(req.size, ParcelSize::Small);
        assert_eq!(req.reference_price.unwrap().to_decimal(), Some(dec!(40)));

        let req: EstimatePricingRequest =
            serde_json::from_str(r#"{"size":"LARGE","reference_price":"59.90"}"#).unwrap();
        assert_eq!(req.postal_code, "");
        assert_eq!(req.reference_price.unwrap().to_decimal(), Some(dec!(59.90)));
    }

    #[test]
    fn test_reference_price_falls_back_silently() {
        let req: EstimatePricingRequest =
            serde_json::from_str(r#"{"size":"MEDIUM","reference_price":"soon"}"#).unwrap();
        assert_eq!(req.reference_price.unwrap().to_decimal(), None);

        let req: EstimatePricingRequest =
            serde_json::from_str(r#"{"size":"MEDIUM","reference_price":-2}"#).unwrap();
        assert_eq!(req.reference_price.unwrap().to_decimal(), None);
    }

    #[test]
    fn test_reference_price_over_cap() {
        assert!(ReferencePriceInput::Number(2_000_000.0).is_over_cap());
        assert!(ReferencePriceInput::Text("79228162514264337593543950335".to_string()).is_over_cap());
        assert!(!ReferencePriceInput::Text("45.50".to_string()).is_over_cap());
        assert!(!ReferencePriceInput::Text("soon".to_string()).is_over_cap());
    }

    #[test]
    fn test_check_manual_amounts() {
        assert!(check_manual_amounts(dec!(0), dec!(0)).is_ok());
        assert!(check_manual_amounts(MAX_AMOUNT_CAD, MAX_AMOUNT_CAD).is_ok());

        match check_manual_amounts(dec!(-1), Decimal::MAX) {
            Err(AppError::Validation { field_errors, .. }) => {
                assert_eq!(field_errors["item_cost_cad"], NON_NEGATIVE);
                assert_eq!(field_errors["shipping_cad"], OVER_CAP);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_manual_pricing_accepts_string_amounts() {
        let req: ManualPricingRequest = serde_json::from_str(
            r#"{"size":"MEDIUM","item_cost_cad":"180.25","shipping_cad":19.5}"#,
        )
        .unwrap();
        assert_eq!(req.item_cost_cad, dec!(180.25));
        assert_eq!(req.shipping_cad, dec!(19.5));
    }
}
