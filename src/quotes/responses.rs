//! Response DTOs for quote endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::{ParcelSize, PricingBreakdown};

use super::models::{Order, Quote, QuoteStatus};

/// What a customer sees about their own quote
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSummary {
    pub id: Uuid,
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
    pub breakdown: PricingBreakdown,
    pub created_at: DateTime<Utc>,
    pub status: QuoteStatus,
}

impl TryFrom<&Quote> for QuoteSummary {
    type Error = AppError;

    fn try_from(quote: &Quote) -> Result<Self, Self::Error> {
        Ok(Self {
            id: quote.id,
            email: quote.email.clone(),
            product_urls: quote.product_url_list(),
            recipient_name: quote.recipient_name.clone(),
            address_line1: quote.address_line1.clone(),
            address_line2: quote.address_line2.clone(),
            city: quote.city.clone(),
            province: quote.province.clone(),
            postal_code: quote.postal_code.clone(),
            notes: quote.notes.clone(),
            size: quote.parcel_size()?,
            breakdown: quote.breakdown(),
            created_at: quote.created_at,
            status: quote.quote_status()?,
        })
    }
}

/// An order together with the quote it pays for
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub quote: Quote,
}

/// One changed field in an admin edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub before: String,
    pub after: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::models::fixtures;

    #[test]
    fn test_summary_from_quote() {
        let summary = QuoteSummary::try_from(&fixtures::quote()).unwrap();

        assert_eq!(summary.size, ParcelSize::Medium);
        assert_eq!(summary.status, QuoteStatus::Sent);
        assert_eq!(summary.product_urls.len(), 2);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["breakdown"]["total_cad"], "150.39");
        assert_eq!(json["status"], "SENT");
        assert_eq!(json["size"], "MEDIUM");
    }
}
