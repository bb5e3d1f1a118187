//! Backend for a purchasing-agent storefront: customers request quotes for
//! marketplace products, an admin reviews and reprices them, and priced
//! quotes move on to checkout.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod cache;
pub mod checkout;
pub mod config;
pub mod contact;
pub mod emails;
pub mod error;
pub mod forms;
pub mod pricing;
pub mod quotes;
pub mod rate_limit;

#[cfg(test)]
mod test_support;

use cache::{AppCache, CacheStats};
use config::Config;
use emails::Mailer;
use rate_limit::RateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub rate_limiter: Arc<RateLimiter>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    cache: CacheStats,
    rate_limit_buckets: usize,
}

/// GET /healthz
async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        cache: state.cache.stats(),
        rate_limit_buckets: state.rate_limiter.bucket_count(),
    })
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .merge(pricing::router())
        .merge(quotes::router())
        .merge(quotes::admin_router(state.clone()))
        .merge(contact::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::emails::testing::RecordingMailer;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(test_support::state());
        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["rate_limit_buckets"], 0);
    }

    #[tokio::test]
    async fn test_estimate() {
        let app = app(test_support::state());
        let response = app
            .oneshot(post_json(
                "/api/pricing/estimate",
                json!({ "size": "MEDIUM", "postal_code": "M5V 2T6" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["currency"], "CAD");
        assert_eq!(body["pricing_version"], "MANUAL-REVIEW");
        assert_eq!(body["total_cad"], "150.39");
    }

    #[tokio::test]
    async fn test_quote_submission_throttled_after_five() {
        let app = app(test_support::state());

        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(post_json("/api/quotes", json!({ "email": "nope" })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let body = body_json(response).await;
            assert_eq!(body["error"], "Please correct the highlighted fields.");
            assert_eq!(body["field_errors"]["email"], "Use a valid email address.");
        }

        let response = app
            .oneshot(post_json("/api/quotes", json!({ "email": "nope" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Too many quote attempts. Please wait a minute and try again."
        );
    }

    #[tokio::test]
    async fn test_contact_sends_email_then_throttles() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut state = test_support::state();
        state.mailer = mailer.clone();
        let app = app(state);

        let message = json!({
            "name": "Sam Rivera",
            "email": "sam@example.ca",
            "message": "Do you ship <large> parcels?"
        });

        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(post_json("/api/contact", message.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, json!({ "success": true }));
        }

        let response = app
            .oneshot(post_json("/api/contact", message))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[0].to, "ops@example.ca");
        assert!(sent[0].text.contains("Do you ship &lt;large&gt; parcels?"));
    }

    #[tokio::test]
    async fn test_admin_requires_token() {
        let app = app(test_support::state());
        let request = Request::post("/api/admin/pricing/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "size": "SMALL", "item_cost_cad": "50", "shipping_cad": "12.99" })
                    .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_order_update_requires_token() {
        let app = app(test_support::state());
        let request = Request::put(format!("/api/admin/orders/{}", uuid::Uuid::nil()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "status": "PAID" }).to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_preview_with_token() {
        let app = app(test_support::state());
        let request = Request::post("/api/admin/pricing/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", test_support::ADMIN_TOKEN),
            )
            .body(Body::from(
                json!({ "size": "SMALL", "item_cost_cad": "50", "shipping_cad": "12.99" })
                    .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // 12% of 50 is below the small-parcel minimum fee of 9.00
        let fee: rust_decimal::Decimal = body["service_fee_cad"].as_str().unwrap().parse().unwrap();
        assert_eq!(fee, rust_decimal_macros::dec!(9));
        assert_eq!(body["total_cad"], "71.99");
    }

    #[tokio::test]
    async fn test_admin_preview_rejects_negative() {
        let app = app(test_support::state());
        let request = Request::post("/api/admin/pricing/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", test_support::ADMIN_TOKEN),
            )
            .body(Body::from(
                json!({ "size": "SMALL", "item_cost_cad": "-1", "shipping_cad": "12.99" })
                    .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Please correct the highlighted fields.");
        assert_eq!(
            body["field_errors"]["item_cost_cad"],
            "Must be a valid non-negative number."
        );
    }

    #[tokio::test]
    async fn test_admin_preview_rejects_amount_over_cap() {
        let app = app(test_support::state());
        let request = Request::post("/api/admin/pricing/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", test_support::ADMIN_TOKEN),
            )
            .body(Body::from(
                json!({
                    "size": "SMALL",
                    "item_cost_cad": "79228162514264337593543950335",
                    "shipping_cad": "1"
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(
            body["field_errors"]["item_cost_cad"],
            "Must be no more than $1,000,000.00."
        );
    }

    #[tokio::test]
    async fn test_estimate_with_huge_reference_price_uses_default() {
        let app = app(test_support::state());
        let response = app
            .oneshot(post_json(
                "/api/pricing/estimate",
                json!({
                    "size": "MEDIUM",
                    "postal_code": "M5V 2T6",
                    "reference_price": "79228162514264337593543950335"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_cad"], "150.39");
    }
}
