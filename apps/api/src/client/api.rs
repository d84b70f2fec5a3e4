//! HTTP side of the extraction client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::extraction::schema::{DecodeError, ExtractionResult, Source};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service answered HTTP {status}")]
    Status { status: u16 },

    #[error("unreadable response: {0}")]
    Decode(#[from] DecodeError),
}

impl ClientError {
    /// Short text shown to the user in the errored state.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => "Failed to fetch from backend".to_string(),
            ClientError::Status { status } => format!("Backend returned HTTP {status}"),
            ClientError::Decode(_) => "Backend sent an unreadable response".to_string(),
        }
    }
}

/// A response as received: the raw body for the JSON view, the decoded fields for the
/// formatted view.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub raw: Value,
    pub result: ExtractionResult,
}

impl Received {
    /// Decodes a service body with the same defaults the service applies to provider output.
    /// A missing `source` is inferred: `fallback` if a `note` is present, `ai` otherwise.
    pub fn from_body(raw: Value) -> Result<Self, DecodeError> {
        let source = match raw.get("source").and_then(Value::as_str) {
            Some("fallback") => Source::Fallback,
            Some("ai") => Source::Ai,
            _ if raw.get("note").is_some() => Source::Fallback,
            _ => Source::Ai,
        };
        let result = ExtractionResult::from_value(&raw, source)?;
        Ok(Self { raw, result })
    }
}

/// The one call the form makes. A trait so the session can run against a fake.
#[async_trait]
pub trait ExtractApi: Send + Sync {
    async fn extract(&self, description: &str) -> Result<Received, ClientError>;
}

pub struct ExtractionClient {
    client: Client,
    base_url: String,
}

impl ExtractionClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ExtractApi for ExtractionClient {
    async fn extract(&self, description: &str) -> Result<Received, ClientError> {
        let response = self
            .client
            .post(format!("{}/extract", self.base_url))
            .json(&json!({ "description": description }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let raw: Value = serde_json::from_slice(&body).map_err(DecodeError::from)?;
        debug!("extract answered {} bytes", body.len());

        Ok(Received::from_body(raw)?)
    }
}
