//! Tagged value type for scenario variables
//!
//! The variable store keeps everything as strings; `Value` is produced at
//! the boundary when a step needs a typed view. Parsing is explicit and
//! surfaces a [`DomainError::Parse`] rather than being sniffed per call
//! site.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A scenario value with its detected type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Plain text, the default.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// A structured JSON value.
    Json(serde_json::Value),
}

impl Value {
    /// Classifies a raw stored string into a typed value.
    ///
    /// Detection order: boolean literal, number, JSON object/array, text.
    /// Detection never fails; anything unrecognised stays [`Value::Text`].
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Self::Number(n);
        }
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(json) = serde_json::from_str(trimmed) {
                return Self::Json(json);
            }
        }
        Self::Text(raw.to_string())
    }

    /// Returns the value as a number, parsing text on demand.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Parse`] when the value is not numeric.
    pub fn as_number(&self) -> DomainResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| DomainError::parse("number", s.clone())),
            other => Err(DomainError::parse("number", other.render())),
        }
    }

    /// Returns the value as a boolean, parsing text on demand.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Parse`] when the value is not `true`/`false`.
    pub fn as_bool(&self) -> DomainResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Text(s) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(DomainError::parse("bool", s.clone())),
            },
            other => Err(DomainError::parse("bool", other.render())),
        }
    }

    /// Returns the value as structured JSON, parsing text on demand.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Parse`] when the value is not valid JSON.
    pub fn as_json(&self) -> DomainResult<serde_json::Value> {
        match self {
            Self::Json(j) => Ok(j.clone()),
            Self::Text(s) => {
                serde_json::from_str(s).map_err(|_| DomainError::parse("json", s.clone()))
            }
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| DomainError::parse("json", n.to_string())),
            Self::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        }
    }

    /// Renders the value back to its string form for storage.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Json(j) => j.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn detect_boolean() {
        assert_eq!(Value::detect("true"), Value::Bool(true));
        assert_eq!(Value::detect(" false "), Value::Bool(false));
    }

    #[test]
    fn detect_number() {
        assert_eq!(Value::detect("42"), Value::Number(42.0));
        assert_eq!(Value::detect("-3.5"), Value::Number(-3.5));
    }

    #[test]
    fn detect_json() {
        let value = Value::detect(r#"{"id": 7}"#);
        assert!(matches!(value, Value::Json(_)));
    }

    #[test]
    fn detect_falls_back_to_text() {
        assert_eq!(
            Value::detect("not a number"),
            Value::Text("not a number".to_string())
        );
        // Malformed JSON stays text.
        assert_eq!(Value::detect("{oops"), Value::Text("{oops".to_string()));
    }

    #[test]
    fn as_number_parses_text() {
        let value = Value::Text("12.5".to_string());
        assert_eq!(value.as_number().unwrap(), 12.5);
    }

    #[test]
    fn as_number_rejects_text() {
        let err = Value::Text("abc".to_string()).as_number().unwrap_err();
        assert_eq!(err, DomainError::parse("number", "abc"));
    }

    #[test]
    fn as_bool_parses_text() {
        assert!(Value::Text("true".to_string()).as_bool().unwrap());
        assert!(Value::Text("yes".to_string()).as_bool().is_err());
    }

    #[test]
    fn as_json_parses_text() {
        let value = Value::Text(r#"[1, 2, 3]"#.to_string());
        let json = value.as_json().unwrap();
        assert_eq!(json, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn render_round_trips_text() {
        assert_eq!(Value::Text("hello".to_string()).render(), "hello");
        assert_eq!(Value::Bool(true).render(), "true");
    }
}
