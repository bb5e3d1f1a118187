//! Helpers shared by the public form handlers.

use std::sync::LazyLock;

use axum::http::HeaderMap;
use regex::Regex;

/// Identity used for clients that send no forwarding header.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Loose syntactic email check; deliverability is the mail provider's problem.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Client identity for throttling: the first `X-Forwarded-For` hop.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

/// Escape the characters that matter inside HTML text and attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Character count, not byte length.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Trimmed value, or `None` when nothing but whitespace was submitted.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("customer@example.ca"));
        assert!(is_valid_email(" first.last+tag@mail.example.com "));
        assert!(!is_valid_email("customer"));
        assert!(!is_valid_email("customer@"));
        assert!(!is_valid_email("customer@example"));
        assert!(!is_valid_email("two words@example.ca"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_client_ip_uses_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_anonymous() {
        assert_eq!(client_ip(&HeaderMap::new()), "anonymous");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        assert_eq!(client_ip(&headers), "anonymous");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom's" & co</b>"#),
            "&lt;b&gt;&quot;Tom&#39;s&quot; &amp; co&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Unit 4 ")), Some("Unit 4".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
