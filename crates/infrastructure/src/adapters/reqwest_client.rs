//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using reqwest's blocking
//! client. Step execution is synchronous by design: the retry executor
//! sleeps between attempts on the scenario's worker thread, so an async
//! client would buy nothing here.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::{Method, Url, header::SET_COOKIE};
use tracing::debug;

use stepflow_application::ports::{HttpClient, HttpClientError};
use stepflow_domain::{Cookie, HttpMethod, RequestSpec, ResponseRecord};

/// Redirect cap applied to every request.
const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation backed by `reqwest::blocking::Client`.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - Cookie store: disabled (cookies are managed in the variable store)
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("Stepflow/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates an HTTP client wrapping a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Rejects malformed JSON bodies before sending.
    fn validate_body(request: &RequestSpec) -> Result<(), HttpClientError> {
        let Some(body) = request.body.as_deref() else {
            return Ok(());
        };
        if body.is_empty() {
            return Ok(());
        }
        if request
            .header("content-type")
            .is_some_and(|ct| ct.contains("application/json"))
        {
            let _: serde_json::Value = serde_json::from_str(body)
                .map_err(|e| HttpClientError::InvalidBody(format!("invalid JSON: {e}")))?;
        }
        Ok(())
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::Dns { host, message };
            }
            if lowered.contains("refused") {
                return HttpClientError::ConnectionRefused { host };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: MAX_REDIRECTS as u32,
            };
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &RequestSpec) -> Result<ResponseRecord, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;

        Self::validate_body(request)?;

        debug!(method = %request.method, url = %request.url, "executing request");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(request.timeout_ms));

        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder
            .send()
            .map_err(|e| Self::map_error(&e, request.timeout_ms))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();

        let cookies: Vec<Cookie> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(Cookie::from_set_cookie)
            .collect();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .text()
            .map_err(|e| HttpClientError::Other(format!("failed to read body: {e}")))?;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(status, duration_ms, "request completed");

        Ok(ResponseRecord {
            status,
            status_text,
            headers,
            cookies,
            body,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_conversion() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[test]
    fn invalid_json_body_is_rejected() {
        let request = RequestSpec::new(HttpMethod::Post, "https://example.com")
            .with_header("Content-Type", "application/json")
            .with_body("{invalid json}");
        let result = ReqwestHttpClient::validate_body(&request);
        assert!(matches!(result, Err(HttpClientError::InvalidBody(_))));
    }

    #[test]
    fn valid_json_body_passes() {
        let request = RequestSpec::new(HttpMethod::Post, "https://example.com")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"key": "value"}"#);
        assert!(ReqwestHttpClient::validate_body(&request).is_ok());
    }

    #[test]
    fn non_json_body_is_not_validated() {
        let request = RequestSpec::new(HttpMethod::Post, "https://example.com")
            .with_header("Content-Type", "text/plain")
            .with_body("{not json}");
        assert!(ReqwestHttpClient::validate_body(&request).is_ok());
    }

    #[test]
    fn malformed_url_is_reported() {
        let client = ReqwestHttpClient::new().unwrap();
        let request = RequestSpec::get("http://[bad");
        let err = client.execute(&request).unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }
}
