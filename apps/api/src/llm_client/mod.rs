//! LLM Client — the single point of entry for all completion-provider calls.
//!
//! ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
//! All LLM interactions MUST go through `CompletionProvider`.
//!
//! Model: gpt-4o-mini (hardcoded — do not make configurable to prevent drift)
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[cfg(test)]
pub(crate) mod testing;

/// The model used for every extraction call.
pub const MODEL: &str = "gpt-4o-mini";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const INITIAL_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider did not answer within {secs}s")]
    Timeout { secs: u64 },

    #[error("Provider returned empty content")]
    EmptyContent,
}

impl ProviderError {
    /// Transport errors, 429 and 5xx are worth another attempt; everything else is final.
    /// An undecodable 2xx body is malformed output, not a transport failure.
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(e) => !e.is_decode(),
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Timeout { .. } | ProviderError::EmptyContent => false,
        }
    }
}

/// Abstract completion capability: `complete(model, prompt) -> text`.
///
/// The returned text is untrusted; callers validate it before use.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Provider capability chosen once at startup and handed to the extraction service.
#[derive(Clone)]
pub enum ProviderHandle {
    Configured(Arc<dyn CompletionProvider>),
    /// No credential: every extraction goes straight to the fallback result.
    Unconfigured,
}

impl ProviderHandle {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        match &config.openai_api_key {
            Some(api_key) => {
                let client = OpenAiClient::new(
                    config.openai_base_url.clone(),
                    api_key.clone(),
                    config.provider_max_retries,
                )?;
                info!("OpenAI client initialised (model: {MODEL})");
                Ok(ProviderHandle::Configured(Arc::new(client)))
            }
            None => {
                warn!("No OPENAI_API_KEY set; using fallback extractor");
                Ok(ProviderHandle::Unconfigured)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ProviderHandle::Configured(_))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it is non-empty.
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// OpenAI chat-completions client in strict JSON-object mode.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, max_retries: u32) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            api_key,
            max_retries,
        })
    }

    async fn call_once(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text().ok_or(ProviderError::EmptyContent)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    /// Retries retryable failures with exponential backoff: 500ms, 1s, 2s...
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.call_once(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_millis(INITIAL_BACKOFF_MS << attempt.min(10));
                    attempt += 1;
                    warn!(
                        "LLM call attempt {} failed ({e}), retrying after {}ms...",
                        attempt,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_requests_json_object_format() {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_chat_response_text_takes_first_choice() {
        let json = r#"{"choices":[{"message":{"content":"{\"a\":1}"}},{"message":{"content":"x"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_chat_response_without_content_is_empty() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(response.text().is_none());

        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_retryable_classification() {
        let rate_limited = ProviderError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        let server = ProviderError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        let auth = ProviderError::Api {
            status: 401,
            message: "bad key".to_string(),
        };
        assert!(rate_limited.is_retryable());
        assert!(server.is_retryable());
        assert!(!auth.is_retryable());
        assert!(!ProviderError::EmptyContent.is_retryable());
        assert!(!ProviderError::Timeout { secs: 1 }.is_retryable());
    }

    #[test]
    fn test_handle_without_key_is_unconfigured() {
        let config = Config::from_lookup(|_| None).unwrap();
        let handle = ProviderHandle::from_config(&config).unwrap();
        assert!(!handle.is_configured());
    }

    #[test]
    fn test_handle_with_key_is_configured() {
        let config = Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        let handle = ProviderHandle::from_config(&config).unwrap();
        assert!(handle.is_configured());
    }
}
