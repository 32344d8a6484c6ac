//! HTTP response record
//!
//! What the HTTP adapter hands back to step services: status, headers,
//! cookies, body, and timing. Step services flatten this into the variable
//! store under the conventional `RESPONSE` / `ResponseHeaders.*` /
//! `ResponseCookie.*` keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A response cookie as parsed from a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

impl Cookie {
    /// Creates a new cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses the `name=value` pair out of a `Set-Cookie` header value,
    /// ignoring attributes such as `Path` or `Expires`.
    #[must_use]
    pub fn from_set_cookie(header_value: &str) -> Option<Self> {
        let pair = header_value.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

/// HTTP response record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResponseRecord {
    /// HTTP status code.
    pub status: u16,
    /// Status text (e.g. "OK", "Not Found").
    pub status_text: String,
    /// Response headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Cookies extracted from `Set-Cookie` headers.
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// Response body as text.
    pub body: String,
    /// Round-trip duration in milliseconds.
    pub duration_ms: u64,
}

impl ResponseRecord {
    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the response content type, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = ResponseRecord {
            status: 200,
            headers,
            ..ResponseRecord::default()
        };

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn set_cookie_parsing_drops_attributes() {
        let cookie = Cookie::from_set_cookie("session=abc123; Path=/; HttpOnly").unwrap();
        assert_eq!(cookie, Cookie::new("session", "abc123"));
    }

    #[test]
    fn set_cookie_without_pair_is_none() {
        assert!(Cookie::from_set_cookie("garbage").is_none());
        assert!(Cookie::from_set_cookie("=value").is_none());
    }

    #[test]
    fn success_range() {
        let ok = ResponseRecord {
            status: 204,
            ..ResponseRecord::default()
        };
        let missing = ResponseRecord {
            status: 404,
            ..ResponseRecord::default()
        };
        assert!(ok.is_success());
        assert!(!missing.is_success());
    }
}
