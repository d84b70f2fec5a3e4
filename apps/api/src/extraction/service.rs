//! Extraction service: prompt → provider → decode, with the fallback policy on top.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::extraction::prompts::build_extraction_prompt;
use crate::extraction::schema::{DecodeError, ExtractionResult};
use crate::llm_client::{ProviderError, ProviderHandle, MODEL};

/// Why an extraction fell back. Never leaves this module except through logs.
#[derive(Debug, Error)]
enum ExtractionFailure {
    #[error("no provider credential configured")]
    Unconfigured,

    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("provider output unusable: {0}")]
    Malformed(#[from] DecodeError),
}

/// Stateless per request; shared across handlers behind an `Arc`.
pub struct ExtractionService {
    provider: ProviderHandle,
    timeout: Duration,
}

impl ExtractionService {
    pub fn new(provider: ProviderHandle, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Always produces a result. Any failure yields `ExtractionResult::fallback()`.
    pub async fn extract(&self, description: &str) -> ExtractionResult {
        match self.try_extract(description).await {
            Ok(result) => result,
            Err(failure) => {
                match &failure {
                    ExtractionFailure::Unconfigured => debug!("Extraction using fallback: {failure}"),
                    ExtractionFailure::Provider(_) => error!("OpenAI extraction failed: {failure}"),
                    ExtractionFailure::Malformed(_) => warn!("OpenAI extraction failed: {failure}"),
                }
                ExtractionResult::fallback()
            }
        }
    }

    async fn try_extract(&self, description: &str) -> Result<ExtractionResult, ExtractionFailure> {
        let ProviderHandle::Configured(provider) = &self.provider else {
            return Err(ExtractionFailure::Unconfigured);
        };

        let prompt = build_extraction_prompt(description);
        let text = tokio::time::timeout(self.timeout, provider.complete(MODEL, &prompt))
            .await
            .map_err(|_| ProviderError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        Ok(ExtractionResult::from_provider_text(&text)?)
    }
}
