//! Database queries for quotes, orders and audits.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::{PricingBreakdown, PRICING_VERSION};

use super::models::{NewQuote, Order, OrderStatus, Quote, QuoteAudit, QuoteStatus};
use super::validation::join_product_urls;

const QUOTE_COLUMNS: &str = r#"
    id, email, product_urls, recipient_name, address_line1, address_line2,
    city, province, postal_code, notes, size, reference_price,
    item_cost_cad, service_fee_cad, shipping_cad, tax_cad, total_cad,
    pricing_version, status, created_at, updated_at
"#;

/// Insert a validated, priced quote
pub async fn insert_quote(
    pool: &PgPool,
    id: Uuid,
    quote: &NewQuote,
    breakdown: &PricingBreakdown,
    status: QuoteStatus,
) -> Result<Quote> {
    let sql = format!(
        r#"
        INSERT INTO quotes (
            id, email, product_urls, recipient_name, address_line1, address_line2,
            city, province, postal_code, notes, size, reference_price,
            item_cost_cad, service_fee_cad, shipping_cad, tax_cad, total_cad,
            pricing_version, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        RETURNING {QUOTE_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, Quote>(&sql)
        .bind(id)
        .bind(&quote.email)
        .bind(join_product_urls(&quote.product_urls))
        .bind(&quote.recipient_name)
        .bind(&quote.address_line1)
        .bind(&quote.address_line2)
        .bind(&quote.city)
        .bind(&quote.province)
        .bind(&quote.postal_code)
        .bind(&quote.notes)
        .bind(quote.size.as_str())
        .bind(quote.reference_price)
        .bind(breakdown.item_cost_cad)
        .bind(breakdown.service_fee_cad)
        .bind(breakdown.shipping_cad)
        .bind(breakdown.tax_cad)
        .bind(breakdown.total_cad)
        .bind(PRICING_VERSION)
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;

    Ok(created)
}

/// Get a quote by id
pub async fn get_quote(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Quote> {
    let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1");

    sqlx::query_as::<_, Quote>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// List quotes newest first, optionally filtered by status
pub async fn list_quotes(
    pool: &PgPool,
    status: Option<QuoteStatus>,
    limit: i64,
) -> Result<Vec<Quote>> {
    let quotes = match status {
        Some(status) => {
            let sql = format!(
                "SELECT {QUOTE_COLUMNS} FROM quotes WHERE status = $1 ORDER BY created_at DESC LIMIT $2"
            );
            sqlx::query_as::<_, Quote>(&sql)
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY created_at DESC LIMIT $1");
            sqlx::query_as::<_, Quote>(&sql)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };

    Ok(quotes)
}

/// Get a quote and lock its row until the transaction ends
pub async fn get_quote_for_update(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Quote> {
    let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1 FOR UPDATE");

    sqlx::query_as::<_, Quote>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// Overwrite a quote's pricing and status
pub async fn update_quote_pricing(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    breakdown: &PricingBreakdown,
    status: QuoteStatus,
) -> Result<Quote> {
    let sql = format!(
        r#"
        UPDATE quotes
        SET item_cost_cad = $2,
            service_fee_cad = $3,
            shipping_cad = $4,
            tax_cad = $5,
            total_cad = $6,
            status = $7,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {QUOTE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Quote>(&sql)
        .bind(id)
        .bind(breakdown.item_cost_cad)
        .bind(breakdown.service_fee_cad)
        .bind(breakdown.shipping_cad)
        .bind(breakdown.tax_cad)
        .bind(breakdown.total_cad)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// Set only a quote's status
pub async fn update_quote_status(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    status: QuoteStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE quotes SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Record an admin edit
pub async fn insert_quote_audit(
    executor: impl PgExecutor<'_>,
    quote_id: Uuid,
    actor_email: &str,
    changes: serde_json::Value,
) -> Result<QuoteAudit> {
    let audit = sqlx::query_as::<_, QuoteAudit>(
        r#"
        INSERT INTO quote_audits (id, quote_id, actor_email, changes)
        VALUES ($1, $2, $3, $4)
        RETURNING id, quote_id, actor_email, changes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(quote_id)
    .bind(actor_email)
    .bind(changes)
    .fetch_one(executor)
    .await?;

    Ok(audit)
}

const ORDER_COLUMNS: &str = r#"
    id, quote_id, stripe_session_id, stripe_payment_id,
    email, total_cad, status, created_at, updated_at
"#;

/// Get an order by id
pub async fn get_order(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// Get an order and lock its row until the transaction ends
pub async fn get_order_for_update(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");

    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// Set an order's status
pub async fn update_order_status(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    status: OrderStatus,
) -> Result<Order> {
    let sql = format!(
        r#"
        UPDATE orders
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
}

/// List orders newest first, optionally filtered by status
pub async fn list_orders(
    pool: &PgPool,
    status: Option<OrderStatus>,
    limit: i64,
) -> Result<Vec<Order>> {
    let sql = format!(
        r#"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY created_at DESC
        LIMIT $2
        "#
    );

    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(orders)
}
