//! Quote requests: intake, storage, admin review and repricing.

pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

pub use models::{Quote, QuoteStatus};
pub use routes::{admin_router, router};
