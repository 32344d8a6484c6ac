//! HTTP step service
//!
//! Resolves templated request arguments, executes the request through the
//! HTTP client port, and flattens the response into the variable store so
//! later steps can read `${RESPONSE}`, `${ResponseHeaders.Content-Type}`
//! and friends.

use std::sync::{Arc, MutexGuard, PoisonError};

use stepflow_domain::{
    Assertion, AssertionResult, Cookie, Header, HttpMethod, RequestSpec, ResponseRecord,
    StatusExpectation,
};

use crate::error::{StepError, StepResult};
use crate::ports::{ConfigSource, HttpClient};
use crate::retry::{self, RetryPolicy};
use crate::steps::keys;
use crate::template::{ResolveOptions, TemplateResolver};
use crate::variables::{SharedStore, VariableStore};

/// Step service for HTTP request/verify steps.
pub struct HttpSteps<C: HttpClient> {
    client: Arc<C>,
    config: Arc<dyn ConfigSource>,
    store: SharedStore,
}

impl<C: HttpClient> HttpSteps<C> {
    /// Creates the service for one scenario.
    pub fn new(client: Arc<C>, config: Arc<dyn ConfigSource>, store: SharedStore) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    /// Sends a request built from templated arguments and records the
    /// response. The body has its `\r\n` sequences normalized.
    ///
    /// # Errors
    ///
    /// Propagates method/URL validation and transport failures.
    pub fn send(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> StepResult<ResponseRecord> {
        self.send_with_options(method, url, headers, body, ResolveOptions::normalized())
    }

    /// As [`send`](Self::send), but leaves the body bytes untouched - for
    /// raw inline JSON/XML content blocks.
    ///
    /// # Errors
    ///
    /// Propagates method/URL validation and transport failures.
    pub fn send_raw(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> StepResult<ResponseRecord> {
        self.send_with_options(method, url, headers, body, ResolveOptions::raw())
    }

    fn send_with_options(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
        options: ResolveOptions,
    ) -> StepResult<ResponseRecord> {
        let request = {
            let store = self.lock_store();
            let mut resolver =
                TemplateResolver::with_options(&store, self.config.as_ref(), options);

            let method: HttpMethod = resolver.resolve(method).parse()?;
            let mut request = RequestSpec::new(method, resolver.resolve(url));
            for (name, value) in headers {
                request
                    .headers
                    .push(Header::new(resolver.resolve(name), resolver.resolve(value)));
            }
            if let Some(body) = body {
                request = request.with_body(resolver.resolve(body));
            }
            drop(resolver);

            if request.header("cookie").is_none() {
                if let Some(cookie_header) = request_cookie_header(&store) {
                    request = request.with_header("Cookie", cookie_header);
                }
            }
            request
        };
        request.validate()?;

        // The store lock is released while the request is on the wire.
        let response = self.client.execute(&request)?;

        let mut store = self.lock_store();
        record_response(&mut store, &response);
        Ok(response)
    }

    /// Sends repeatedly under `policy` until `check` accepts the response
    /// or the retry budget is exhausted; the last failure propagates.
    ///
    /// # Errors
    ///
    /// The final attempt's error, unchanged.
    pub fn send_until<F>(
        &self,
        policy: RetryPolicy,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
        check: F,
    ) -> StepResult<ResponseRecord>
    where
        F: Fn(&ResponseRecord) -> StepResult<()>,
    {
        retry::run(policy, || {
            let response = self.send(method, url, headers, body)?;
            check(&response)?;
            Ok(response)
        })
    }

    /// Asserts on the stored status of the last response.
    ///
    /// # Errors
    ///
    /// [`StepError::MissingVariable`] when no response was recorded,
    /// [`StepError::Assertion`] when the status does not match.
    pub fn verify_status(&self, expected: &StatusExpectation) -> StepResult<()> {
        let store = self.lock_store();
        let raw = store
            .get(keys::RESPONSE_STATUS)
            .ok_or_else(|| StepError::MissingVariable(keys::RESPONSE_STATUS.to_string()))?;
        let status: u16 = raw
            .parse()
            .map_err(|_| StepError::Assertion(format!("stored status '{raw}' is not a number")))?;

        if expected.matches(status) {
            Ok(())
        } else {
            Err(StepError::Assertion(format!(
                "expected status {}, got {status}",
                expected.description()
            )))
        }
    }

    /// Runs a batch of assertions against the last recorded response.
    /// `run` is the checker, typically the infrastructure assertion
    /// runner's `run` method.
    ///
    /// # Errors
    ///
    /// [`StepError::MissingVariable`] when no response was recorded,
    /// [`StepError::Assertion`] listing every failed check.
    pub fn verify_assertions<F>(&self, assertions: &[Assertion], run: F) -> StepResult<()>
    where
        F: Fn(&Assertion, &ResponseRecord) -> AssertionResult,
    {
        let response = self.last_response()?;
        let failures: Vec<String> = assertions
            .iter()
            .map(|assertion| run(assertion, &response))
            .filter(|result| !result.passed)
            .map(|result| {
                result
                    .error
                    .unwrap_or_else(|| result.assertion.description())
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StepError::Assertion(failures.join("; ")))
        }
    }

    /// Rebuilds the last response from what [`record_response`] stored.
    /// `status_text` and `duration_ms` are not recorded and come back
    /// empty/zero.
    fn last_response(&self) -> StepResult<ResponseRecord> {
        let store = self.lock_store();
        let status: u16 = store
            .get(keys::RESPONSE_STATUS)
            .ok_or_else(|| StepError::MissingVariable(keys::RESPONSE_STATUS.to_string()))?
            .parse()
            .map_err(|_| StepError::Assertion("stored status is not a number".to_string()))?;

        let mut headers = std::collections::HashMap::new();
        let mut cookies = Vec::new();
        for (key, value) in store.iter() {
            if let Some(name) = key.strip_prefix(keys::RESPONSE_HEADER_PREFIX) {
                headers.insert(name.to_string(), value.to_string());
            } else if let Some(name) = key.strip_prefix(keys::RESPONSE_COOKIE_PREFIX) {
                cookies.push(Cookie::new(name, value));
            }
        }

        Ok(ResponseRecord {
            status,
            status_text: String::new(),
            headers,
            cookies,
            body: store.get(keys::RESPONSE).unwrap_or_default().to_string(),
            duration_ms: 0,
        })
    }

    /// Registers a cookie to attach to subsequent requests. The value is
    /// resolved before storing.
    pub fn set_request_cookie(&self, name: &str, value: &str) {
        let mut store = self.lock_store();
        let resolved = {
            let mut resolver = TemplateResolver::new(&store, self.config.as_ref());
            resolver.resolve(value)
        };
        store.set(&format!("{}{name}", keys::REQUEST_COOKIE_PREFIX), resolved);
    }

    /// Drops all registered request cookies.
    pub fn clear_request_cookies(&self) {
        self.lock_store().clear_prefix(keys::REQUEST_COOKIE_PREFIX);
    }

    /// Drops everything recorded from the last response.
    pub fn clear_response_state(&self) {
        let mut store = self.lock_store();
        store.remove(keys::RESPONSE);
        store.remove(keys::RESPONSE_STATUS);
        store.clear_prefix(keys::RESPONSE_HEADER_PREFIX);
        store.clear_prefix(keys::RESPONSE_COOKIE_PREFIX);
    }

    fn lock_store(&self) -> MutexGuard<'_, VariableStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Joins the scenario's `RequestCookie.*` variables into one `Cookie`
/// header value.
fn request_cookie_header(store: &VariableStore) -> Option<String> {
    let pairs: Vec<String> = store
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(keys::REQUEST_COOKIE_PREFIX)
                .map(|name| format!("{name}={value}"))
        })
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Flattens a response into the store, replacing anything recorded from a
/// previous response.
fn record_response(store: &mut VariableStore, response: &ResponseRecord) {
    store.clear_prefix(keys::RESPONSE_HEADER_PREFIX);
    store.clear_prefix(keys::RESPONSE_COOKIE_PREFIX);

    store.set(keys::RESPONSE, response.body.clone());
    store.set(keys::RESPONSE_STATUS, response.status.to_string());
    for (name, value) in &response.headers {
        store.set(
            &format!("{}{name}", keys::RESPONSE_HEADER_PREFIX),
            value.clone(),
        );
    }
    for cookie in &response.cookies {
        store.set(
            &format!("{}{}", keys::RESPONSE_COOKIE_PREFIX, cookie.name),
            cookie.value.clone(),
        );
    }
}
