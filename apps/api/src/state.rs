use std::sync::Arc;

use crate::extraction::ExtractionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Holds the provider capability chosen at startup; no per-request mutable state.
    pub extractor: Arc<ExtractionService>,
}
