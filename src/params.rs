//! Parameter lists carried by the deprecated JSON metadata directive.

use serde_json::value::RawValue;
use serde_json::Value as JsonValue;
use std::fmt;

/// Separator used by the colon format, `%UPSTREAM_METADATA(a:b)%`.
pub const COLON_SEPARATOR: &str = ":";

/// Non-empty, ordered list of metadata lookup keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList(Vec<String>);

impl ParameterList {
    /// Keys in lookup order.
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Number of keys (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; an empty array never becomes a `ParameterList`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys joined with `:`, first key first.
    pub fn to_colon_format(&self) -> String {
        self.0.join(COLON_SEPARATOR)
    }
}

impl fmt::Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_colon_format())
    }
}

/// Reasons a metadata payload cannot be turned into a parameter list.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON payload is not an array")]
    NotAnArray,

    #[error("JSON payload is an empty array")]
    EmptyArray,

    #[error("Array element {index} is not a string, number or boolean")]
    NonScalarElement { index: usize },
}

/// Parse a JSON array literal such as `["a", "b"]` into a parameter list.
///
/// Strings are taken decoded; numbers and booleans keep their source text,
/// so the colon form is always at least two bytes shorter than the array.
pub fn parse_parameter_list(payload: &str) -> Result<ParameterList, PayloadError> {
    let value: JsonValue = serde_json::from_str(payload)?;

    let JsonValue::Array(elements) = value else {
        return Err(PayloadError::NotAnArray);
    };

    if elements.is_empty() {
        return Err(PayloadError::EmptyArray);
    }

    let raw: Vec<&RawValue> = serde_json::from_str(payload)?;

    elements
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (element, raw))| match element {
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(_) | JsonValue::Bool(_) => Ok(raw.get().to_string()),
            _ => Err(PayloadError::NonScalarElement { index }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ParameterList)
}
