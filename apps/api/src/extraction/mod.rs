// Extraction: free-text app description -> appName / entities / roles / features.
// All provider calls go through llm_client; every failure ends in the fallback result.

pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod service;

pub use schema::{ExtractionResult, Source};
pub use service::ExtractionService;
