//! Assertion runner.
//!
//! Executes declarative assertions against a recorded response. Verify
//! steps run these inside the retry executor, so a failing result here is
//! what gets retried until the response settles or the budget runs out.

use regex::Regex;

use stepflow_domain::{Assertion, AssertionResult, ResponseRecord, StatusExpectation};

/// Runs assertions against responses.
#[derive(Debug, Default)]
pub struct AssertionRunner;

impl AssertionRunner {
    /// Creates a new runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs a batch of assertions, returning one result per assertion.
    #[must_use]
    pub fn run_all(&self, assertions: &[Assertion], response: &ResponseRecord) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| self.run(assertion, response))
            .collect()
    }

    /// Runs a single assertion against a response.
    #[must_use]
    pub fn run(&self, assertion: &Assertion, response: &ResponseRecord) -> AssertionResult {
        match assertion {
            Assertion::StatusCode { expected } => check_status(assertion, response, expected),
            Assertion::HeaderExists { name, value } => {
                check_header(assertion, response, name, value.as_deref())
            }
            Assertion::BodyContains { text, ignore_case } => {
                check_body_contains(assertion, response, text, *ignore_case)
            }
            Assertion::BodyMatches { pattern } => check_body_matches(assertion, response, pattern),
            Assertion::JsonPath { path, expected } => {
                check_json_path(assertion, response, path, expected.as_ref())
            }
            Assertion::IsJson => check_is_json(assertion, response),
        }
    }
}

fn check_status(
    assertion: &Assertion,
    response: &ResponseRecord,
    expected: &StatusExpectation,
) -> AssertionResult {
    let actual = response.status;
    if expected.matches(actual) {
        AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
    } else {
        AssertionResult::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            format!("expected status {}, got {actual}", expected.description()),
        )
    }
}

fn check_header(
    assertion: &Assertion,
    response: &ResponseRecord,
    name: &str,
    expected: Option<&str>,
) -> AssertionResult {
    match (response.header(name), expected) {
        (Some(actual), Some(expected)) if actual == expected => {
            AssertionResult::pass_with_value(assertion.clone(), actual)
        }
        (Some(actual), Some(expected)) => AssertionResult::fail_with_value(
            assertion.clone(),
            actual,
            format!("header '{name}' is '{actual}', expected '{expected}'"),
        ),
        (Some(actual), None) => AssertionResult::pass_with_value(assertion.clone(), actual),
        (None, _) => AssertionResult::fail(assertion.clone(), format!("header '{name}' not found")),
    }
}

fn check_body_contains(
    assertion: &Assertion,
    response: &ResponseRecord,
    text: &str,
    ignore_case: bool,
) -> AssertionResult {
    let found = if ignore_case {
        response.body.to_lowercase().contains(&text.to_lowercase())
    } else {
        response.body.contains(text)
    };
    if found {
        AssertionResult::pass(assertion.clone())
    } else {
        AssertionResult::fail(assertion.clone(), format!("body does not contain '{text}'"))
    }
}

fn check_body_matches(
    assertion: &Assertion,
    response: &ResponseRecord,
    pattern: &str,
) -> AssertionResult {
    match Regex::new(pattern) {
        Ok(regex) if regex.is_match(&response.body) => AssertionResult::pass(assertion.clone()),
        Ok(_) => AssertionResult::fail(
            assertion.clone(),
            format!("body does not match /{pattern}/"),
        ),
        Err(e) => AssertionResult::fail(assertion.clone(), format!("invalid pattern: {e}")),
    }
}

fn check_json_path(
    assertion: &Assertion,
    response: &ResponseRecord,
    path: &str,
    expected: Option<&serde_json::Value>,
) -> AssertionResult {
    let parsed: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(e) => {
            return AssertionResult::fail(assertion.clone(), format!("body is not JSON: {e}"));
        }
    };

    let Some(actual) = lookup_path(&parsed, path) else {
        return AssertionResult::fail(assertion.clone(), format!("path '{path}' not found"));
    };

    match expected {
        Some(expected) if actual == expected => {
            AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
        }
        Some(expected) => AssertionResult::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            format!("json {path} is {actual}, expected {expected}"),
        ),
        None => AssertionResult::pass_with_value(assertion.clone(), actual.to_string()),
    }
}

fn check_is_json(assertion: &Assertion, response: &ResponseRecord) -> AssertionResult {
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(_) => AssertionResult::pass(assertion.clone()),
        Err(e) => AssertionResult::fail(assertion.clone(), format!("body is not JSON: {e}")),
    }
}

/// Walks a dotted path through a JSON value. Numeric segments index into
/// arrays, e.g. `data.items.0.id`.
fn lookup_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn response(status: u16, body: &str) -> ResponseRecord {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        ResponseRecord {
            status,
            status_text: String::new(),
            headers,
            cookies: Vec::new(),
            body: body.to_string(),
            duration_ms: 12,
        }
    }

    #[test]
    fn status_assertion() {
        let runner = AssertionRunner::new();
        let response = response(404, "");

        let pass = runner.run(
            &Assertion::StatusCode {
                expected: StatusExpectation::Exact(404),
            },
            &response,
        );
        assert!(pass.passed);
        assert_eq!(pass.actual.as_deref(), Some("404"));

        let fail = runner.run(
            &Assertion::StatusCode {
                expected: StatusExpectation::success(),
            },
            &response,
        );
        assert!(!fail.passed);
        assert_eq!(
            fail.error.as_deref(),
            Some("expected status in 200-299, got 404")
        );
    }

    #[test]
    fn header_assertion_is_case_insensitive_on_names() {
        let runner = AssertionRunner::new();
        let response = response(200, "");

        let pass = runner.run(
            &Assertion::HeaderExists {
                name: "content-type".to_string(),
                value: Some("application/json".to_string()),
            },
            &response,
        );
        assert!(pass.passed);

        let fail = runner.run(
            &Assertion::HeaderExists {
                name: "x-request-id".to_string(),
                value: None,
            },
            &response,
        );
        assert!(!fail.passed);
    }

    #[test]
    fn body_contains_respects_ignore_case() {
        let runner = AssertionRunner::new();
        let response = response(200, r#"{"status": "Created"}"#);

        let exact = runner.run(
            &Assertion::BodyContains {
                text: "created".to_string(),
                ignore_case: false,
            },
            &response,
        );
        assert!(!exact.passed);

        let fuzzy = runner.run(
            &Assertion::BodyContains {
                text: "created".to_string(),
                ignore_case: true,
            },
            &response,
        );
        assert!(fuzzy.passed);
    }

    #[test]
    fn body_matches_regex() {
        let runner = AssertionRunner::new();
        let response = response(200, "order-12345 accepted");

        assert!(
            runner
                .run(
                    &Assertion::BodyMatches {
                        pattern: r"order-\d+".to_string(),
                    },
                    &response,
                )
                .passed
        );

        let bad = runner.run(
            &Assertion::BodyMatches {
                pattern: "(unclosed".to_string(),
            },
            &response,
        );
        assert!(!bad.passed);
    }

    #[test]
    fn json_path_walks_objects_and_arrays() {
        let runner = AssertionRunner::new();
        let response = response(
            200,
            r#"{"data": {"items": [{"id": 7, "name": "widget"}]}}"#,
        );

        let pass = runner.run(
            &Assertion::JsonPath {
                path: "data.items.0.id".to_string(),
                expected: Some(json!(7)),
            },
            &response,
        );
        assert!(pass.passed);
        assert_eq!(pass.actual.as_deref(), Some("7"));

        let exists = runner.run(
            &Assertion::JsonPath {
                path: "data.items.0.name".to_string(),
                expected: None,
            },
            &response,
        );
        assert!(exists.passed);

        let missing = runner.run(
            &Assertion::JsonPath {
                path: "data.items.3.id".to_string(),
                expected: None,
            },
            &response,
        );
        assert!(!missing.passed);

        let mismatch = runner.run(
            &Assertion::JsonPath {
                path: "data.items.0.id".to_string(),
                expected: Some(json!(8)),
            },
            &response,
        );
        assert!(!mismatch.passed);
    }

    #[test]
    fn is_json_assertion() {
        let runner = AssertionRunner::new();
        assert!(runner.run(&Assertion::IsJson, &response(200, "[1, 2]")).passed);
        assert!(!runner.run(&Assertion::IsJson, &response(200, "not json")).passed);
    }

    #[test]
    fn run_all_keeps_assertion_order() {
        let runner = AssertionRunner::new();
        let response = response(200, "{}");
        let results = runner.run_all(
            &[
                Assertion::IsJson,
                Assertion::StatusCode {
                    expected: StatusExpectation::Exact(500),
                },
            ],
            &response,
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].passed);
        assert!(!results[1].passed);
    }
}
