//! Extraction result shape and the decode-with-defaults step for untrusted JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Used when the provider omits `appName` or sends a blank / non-string value.
pub const PLACEHOLDER_APP_NAME: &str = "Untitled App";

pub const FALLBACK_APP_NAME: &str = "Course Manager";
pub const FALLBACK_ENTITIES: [&str; 3] = ["Student", "Course", "Grade"];
pub const FALLBACK_ROLES: [&str; 3] = ["Teacher", "Student", "Admin"];
pub const FALLBACK_FEATURES: [&str; 3] = ["Add course", "Enroll students", "View reports"];
pub const FALLBACK_NOTE: &str = "fallback (no API key / API error)";

/// Where the values of an `ExtractionResult` came from. Always set by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Fallback,
}

/// The `/extract` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub app_name: String,
    pub entities: Vec<String>,
    pub roles: Vec<String>,
    pub features: Vec<String>,
    /// Only set on fallback results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub source: Source,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl ExtractionResult {
    /// The fixed result returned whenever the provider path is unavailable or fails.
    pub fn fallback() -> Self {
        Self {
            app_name: FALLBACK_APP_NAME.to_string(),
            entities: to_strings(&FALLBACK_ENTITIES),
            roles: to_strings(&FALLBACK_ROLES),
            features: to_strings(&FALLBACK_FEATURES),
            note: Some(FALLBACK_NOTE.to_string()),
            source: Source::Fallback,
        }
    }

    /// Decodes provider output text. Code fences are tolerated; anything that is not a
    /// JSON object is an error. Field shapes are coerced, never rejected.
    pub fn from_provider_text(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(strip_json_fences(text))?;
        Self::from_value(&value, Source::Ai)
    }

    /// Decode-with-defaults over an untrusted JSON value. `source` is supplied by the
    /// caller; the value's own `source` key is ignored.
    pub fn from_value(value: &Value, source: Source) -> Result<Self, DecodeError> {
        let object = value
            .as_object()
            .ok_or_else(|| DecodeError::NotAnObject(json_kind(value)))?;
        Ok(Self::from_object(object, source))
    }

    fn from_object(object: &Map<String, Value>, source: Source) -> Self {
        let app_name = object
            .get("appName")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(PLACEHOLDER_APP_NAME)
            .to_string();

        let note = match source {
            Source::Fallback => object
                .get("note")
                .and_then(Value::as_str)
                .map(str::to_string),
            Source::Ai => None,
        };

        Self {
            app_name,
            entities: string_list(object.get("entities")),
            roles: string_list(object.get("roles")),
            features: string_list(object.get("features")),
            note,
            source,
        }
    }
}

/// Arrays keep their string elements in order; anything else becomes an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let body = body.trim_start();
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}
