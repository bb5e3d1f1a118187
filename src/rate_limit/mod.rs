//! Submission throttling.
//!
//! Quote and contact forms are limited per client IP with a fixed window.
//! Keys take the form `"<form>:<client ip>"`.

pub mod clock;
pub mod limiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{RateBucket, RateLimiter};

/// Bucket key for one form and one client.
pub fn form_key(form: &str, client_ip: &str) -> String {
    format!("{form}:{client_ip}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_key() {
        assert_eq!(form_key("quote", "203.0.113.9"), "quote:203.0.113.9");
        assert_eq!(form_key("contact", "anonymous"), "contact:anonymous");
    }
}
