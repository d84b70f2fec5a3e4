use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub const SERVICE_NAME: &str = "mini-ai-app-backend";

/// GET /health
/// Liveness plus whether a provider credential was loaded at startup.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "keyLoaded": state.extractor.is_configured()
    }))
}

/// GET /
pub async fn root_handler() -> &'static str {
    "Mini AI App backend is running. Try GET /health or POST /extract."
}
