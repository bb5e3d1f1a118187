//! Pricing engine module.
//!
//! Deterministic quote pricing: item cost, service fee, shipping, tax and
//! total, all floored to the cent. Shared by quote intake, the public
//! estimate endpoint and the admin repricing screen.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;

// Re-export commonly used items
pub use calculators::{calculate_pricing, floor_cents, reprice_manual, PRICING_VERSION};
pub use models::{ParcelSize, PricingBreakdown};
pub use routes::router;
