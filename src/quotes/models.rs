//! Database models for quotes, orders and audit entries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.
//! Enumerations are stored as upper-case text.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::{ParcelSize, PricingBreakdown};

use super::validation::split_product_urls;

/// Lifecycle of a quote request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteStatus {
    New,
    Sent,
    Approved,
    Paid,
    Cancelled,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::New => "NEW",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Approved => "APPROVED",
            QuoteStatus::Paid => "PAID",
            QuoteStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(QuoteStatus::New),
            "SENT" => Ok(QuoteStatus::Sent),
            "APPROVED" => Ok(QuoteStatus::Approved),
            "PAID" => Ok(QuoteStatus::Paid),
            "CANCELLED" => Ok(QuoteStatus::Cancelled),
            other => Err(AppError::Internal(format!("unknown quote status '{other}'"))),
        }
    }
}

/// Payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

/// Quote row from `quotes`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: Uuid,
    pub email: String,
    pub product_urls: Option<String>,
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub size: String,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub reference_price: Option<Decimal>,
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
    pub pricing_version: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn parcel_size(&self) -> Result<ParcelSize, AppError> {
        self.size
            .parse()
            .map_err(|e: crate::pricing::models::UnknownParcelSize| AppError::Internal(e.to_string()))
    }

    pub fn quote_status(&self) -> Result<QuoteStatus, AppError> {
        self.status.parse()
    }

    pub fn breakdown(&self) -> PricingBreakdown {
        PricingBreakdown {
            item_cost_cad: self.item_cost_cad,
            service_fee_cad: self.service_fee_cad,
            shipping_cad: self.shipping_cad,
            tax_cad: self.tax_cad,
            total_cad: self.total_cad,
        }
    }

    pub fn product_url_list(&self) -> Vec<String> {
        self.product_urls
            .as_deref()
            .map(split_product_urls)
            .unwrap_or_default()
    }
}

/// Validated quote ready to insert
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub email: String,
    pub product_urls: Vec<String>,
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub size: ParcelSize,
    pub reference_price: Option<Decimal>,
}

/// Order row from `orders`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_id: Option<String>,
    pub email: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cad: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit row from `quote_audits`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuoteAudit {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub actor_email: String,
    pub changes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_status_round_trip() {
        for status in [
            QuoteStatus::New,
            QuoteStatus::Sent,
            QuoteStatus::Approved,
            QuoteStatus::Paid,
            QuoteStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<QuoteStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_quote_accessors() {
        let quote = fixtures::quote();

        assert_eq!(quote.parcel_size().unwrap(), ParcelSize::Medium);
        assert_eq!(quote.quote_status().unwrap(), QuoteStatus::Sent);
        assert_eq!(quote.breakdown().total_cad, dec!(150.39));
        assert_eq!(quote.product_url_list().len(), 2);
    }

    #[test]
    fn test_quote_with_unknown_size_is_internal_error() {
        let mut quote = fixtures::quote();
        quote.size = "XL".to_string();
        assert!(matches!(quote.parcel_size(), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_quote_without_product_urls() {
        let mut quote = fixtures::quote();
        quote.product_urls = None;
        assert!(quote.product_url_list().is_empty());
    }
}
