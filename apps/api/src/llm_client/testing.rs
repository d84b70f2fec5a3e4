//! In-process `CompletionProvider` for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionProvider, ProviderError};

enum Script {
    Reply(String),
    Fail { status: u16, message: String },
}

/// Answers every call the same way and records `(model, prompt)` pairs.
pub struct ScriptedProvider {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self::with_script(Script::Reply(text.to_string()))
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self::with_script(Script::Fail {
            status,
            message: message.to_string(),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail { status, message } => Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
