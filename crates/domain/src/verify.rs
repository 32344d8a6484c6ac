//! Response assertions
//!
//! Declarative checks that verify steps run against a response, typically
//! wrapped in the retry executor so an assertion can be polled until it
//! holds or the retry budget runs out.

use serde::{Deserialize, Serialize};

/// Expected status code value or range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Inclusive range of status codes.
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of several status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Checks whether a status code satisfies this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Human-readable form of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes.join(", "))
            }
        }
    }

    /// The 2xx success expectation.
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// A single check against a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Status code matches the expectation.
    StatusCode {
        /// Expected status code or range.
        expected: StatusExpectation,
    },
    /// Header exists, optionally with an exact value.
    HeaderExists {
        /// Header name (case-insensitive).
        name: String,
        /// Optional expected value.
        value: Option<String>,
    },
    /// Body contains the given text.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// Body matches a regex pattern.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
    /// Dotted JSON path exists, optionally with an expected value.
    JsonPath {
        /// Dotted path, e.g. `data.items.0.id`.
        path: String,
        /// Expected value at the path.
        expected: Option<serde_json::Value>,
    },
    /// Body parses as JSON.
    IsJson,
}

impl Assertion {
    /// Human-readable description of the check.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("status code {}", expected.description()),
            Self::HeaderExists {
                name,
                value: Some(v),
            } => format!("header '{name}' equals '{v}'"),
            Self::HeaderExists { name, value: None } => format!("header '{name}' exists"),
            Self::BodyContains { text, .. } => format!("body contains '{text}'"),
            Self::BodyMatches { pattern } => format!("body matches /{pattern}/"),
            Self::JsonPath {
                path,
                expected: Some(v),
            } => format!("json {path} equals {v}"),
            Self::JsonPath {
                path,
                expected: None,
            } => format!("json {path} exists"),
            Self::IsJson => "body is valid JSON".to_string(),
        }
    }
}

/// Outcome of running a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Actual value observed, for diagnostics.
    pub actual: Option<String>,
    /// Failure message when the assertion did not hold.
    pub error: Option<String>,
}

impl AssertionResult {
    /// A passing result.
    #[must_use]
    pub const fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// A passing result carrying the observed value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// A failing result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// A failing result carrying the observed value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}
