//! Outbound email: rendering and delivery.
//!
//! Bodies are plain-text askama templates under `templates/emails/`.
//! Delivery goes through the [`Mailer`] trait so handlers never know which
//! provider (if any) is configured.

use askama::Template;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::Result;
use crate::quotes::models::NewQuote;
use crate::quotes::responses::QuoteSummary;

/// A rendered message ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Delivery seam for outbound mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<()>;
}

/// Mailer used when no provider is configured: logs and drops the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<()> {
        info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.text.len(),
            "Email provider not configured, logging message instead"
        );
        Ok(())
    }
}

/// `$1,234.56` style Canadian dollar amount.
pub fn format_cad(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${grouped}.{cents}", if negative { "-" } else { "" })
}

#[derive(Template)]
#[template(path = "emails/quote_customer.txt")]
struct QuoteCustomerTemplate<'a> {
    quote_id: String,
    site_url: &'a str,
    product_urls: &'a [String],
    recipient_name: &'a str,
    address_line1: &'a str,
    address_line2: &'a str,
    city: &'a str,
    province: &'a str,
    postal_code: &'a str,
    size: &'a str,
    total: String,
    notes: &'a str,
    reference_price: String,
}

#[derive(Template)]
#[template(path = "emails/quote_admin.txt")]
struct QuoteAdminTemplate<'a> {
    quote_id: String,
    site_url: &'a str,
    email: &'a str,
    product_urls: &'a [String],
    recipient_name: &'a str,
    address_line1: &'a str,
    address_line2: &'a str,
    city: &'a str,
    province: &'a str,
    postal_code: &'a str,
    size: &'a str,
    total: String,
    notes: &'a str,
    reference_price: String,
}

#[derive(Template)]
#[template(path = "emails/contact.txt")]
struct ContactTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Addresses the quote and contact emails are sent between
#[derive(Debug, Clone, Copy)]
pub struct Addresses<'a> {
    pub from: &'a str,
    pub admin: &'a str,
    pub site_url: &'a str,
}

/// Customer confirmation and admin notification for a new quote.
pub fn build_quote_emails(
    addresses: Addresses<'_>,
    quote: &NewQuote,
    summary: &QuoteSummary,
) -> Result<(Email, Email)> {
    let quote_id = summary.id.to_string();
    let total = format_cad(summary.breakdown.total_cad);
    let reference_price = quote.reference_price.map(format_cad).unwrap_or_default();
    let address_line2 = quote.address_line2.as_deref().unwrap_or_default();
    let notes = quote.notes.as_deref().unwrap_or_default();

    let customer = QuoteCustomerTemplate {
        quote_id: quote_id.clone(),
        site_url: addresses.site_url,
        product_urls: &quote.product_urls,
        recipient_name: &quote.recipient_name,
        address_line1: &quote.address_line1,
        address_line2,
        city: &quote.city,
        province: &quote.province,
        postal_code: &quote.postal_code,
        size: quote.size.as_str(),
        total: total.clone(),
        notes,
        reference_price: reference_price.clone(),
    }
    .render()?;

    let admin = QuoteAdminTemplate {
        quote_id,
        site_url: addresses.site_url,
        email: &quote.email,
        product_urls: &quote.product_urls,
        recipient_name: &quote.recipient_name,
        address_line1: &quote.address_line1,
        address_line2,
        city: &quote.city,
        province: &quote.province,
        postal_code: &quote.postal_code,
        size: quote.size.as_str(),
        total,
        notes,
        reference_price,
    }
    .render()?;

    Ok((
        Email {
            from: addresses.from.to_string(),
            to: quote.email.clone(),
            reply_to: None,
            subject: "We received your request".to_string(),
            text: customer,
        },
        Email {
            from: addresses.from.to_string(),
            to: addresses.admin.to_string(),
            reply_to: Some(quote.email.clone()),
            subject: format!("Manual quote requested – {}", quote.postal_code),
            text: admin,
        },
    ))
}

/// Admin notification for a contact form message. `message` must already be escaped.
pub fn build_contact_email(
    addresses: Addresses<'_>,
    name: &str,
    email: &str,
    message: &str,
) -> Result<Email> {
    let text = ContactTemplate {
        name,
        email,
        message,
    }
    .render()?;

    Ok(Email {
        from: addresses.from.to_string(),
        to: addresses.admin.to_string(),
        reply_to: Some(email.to_string()),
        subject: format!("Contact form inquiry from {name}"),
        text,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::models::fixtures;
    use rust_decimal_macros::dec;

    const ADDRESSES: Addresses<'static> = Addresses {
        from: "no-reply@shop.example.ca",
        admin: "ops@shop.example.ca",
        site_url: "https://shop.example.ca",
    };

    #[test]
    fn test_format_cad() {
        assert_eq!(format_cad(dec!(0)), "$0.00");
        assert_eq!(format_cad(dec!(150.39)), "$150.39");
        assert_eq!(format_cad(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_cad(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_cad(dec!(-12.3)), "-$12.30");
    }

    #[test]
    fn test_quote_emails() {
        let summary = QuoteSummary::try_from(&fixtures::quote()).unwrap();
        let (customer, admin) = build_quote_emails(ADDRESSES, &fixtures::new_quote(), &summary).unwrap();

        assert_eq!(customer.to, "customer@example.ca");
        assert_eq!(customer.subject, "We received your request");
        assert!(customer.text.contains("https://item.taobao.com/item.htm?id=1"));
        assert!(customer.text.contains("Unit 4"));
        assert!(customer.text.contains("Estimated total: $150.39"));
        assert!(customer.text.contains("Reference price: $45.50"));

        assert_eq!(admin.to, "ops@shop.example.ca");
        assert_eq!(admin.subject, "Manual quote requested – M5V 2T6");
        assert_eq!(admin.reply_to.as_deref(), Some("customer@example.ca"));
        assert!(admin.text.contains("Customer email: customer@example.ca"));
        assert!(admin.text.contains("Notes: Blue &amp; white"));
    }

    #[test]
    fn test_quote_emails_without_products() {
        let mut quote = fixtures::new_quote();
        quote.product_urls.clear();
        quote.notes = None;
        let summary = QuoteSummary::try_from(&fixtures::quote()).unwrap();

        let (customer, admin) = build_quote_emails(ADDRESSES, &quote, &summary).unwrap();
        assert!(customer.text.contains("Product link: Not provided"));
        assert!(admin.text.contains("Product URL: Not provided"));
        assert!(!admin.text.contains("Notes:"));
    }

    #[test]
    fn test_contact_email() {
        let email =
            build_contact_email(ADDRESSES, "Sam", "sam@example.ca", "Hello &lt;there&gt;").unwrap();

        assert_eq!(email.subject, "Contact form inquiry from Sam");
        assert_eq!(email.to, "ops@shop.example.ca");
        assert_eq!(email.reply_to.as_deref(), Some("sam@example.ca"));
        assert!(email.text.contains("From: Sam <sam@example.ca>"));
        assert!(email.text.contains("Hello &lt;there&gt;"));
    }

    #[tokio::test]
    async fn test_recording_mailer() {
        let mailer = testing::RecordingMailer::default();
        let email = build_contact_email(ADDRESSES, "Sam", "sam@example.ca", "Hi there").unwrap();
        mailer.send(email.clone()).await.unwrap();
        assert_eq!(mailer.sent(), vec![email]);
    }
}
