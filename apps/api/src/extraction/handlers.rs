//! Axum route handlers for the Extraction API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::AppError;
use crate::extraction::ExtractionResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExtractRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
}

/// `null` reads as empty; numbers and booleans read as their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// POST /extract
///
/// Always answers with an `ExtractionResult`; provider trouble becomes the fallback result.
/// A body sent without a JSON content type is read as an empty description.
pub async fn handle_extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => ExtractRequest::default(),
        Err(rejection) => return Err(AppError::Validation(rejection.body_text())),
    };

    let result = state.extractor.extract(&request.description).await;

    Ok(Json(result))
}
