use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Completion service configuration from environment variables
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://aipipe.org/openrouter/v1";
    pub const DEFAULT_MODEL: &'static str = "openai/gpt-4.1-nano";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 3000;
    pub const TIMEOUT: Duration = Duration::from_secs(120);

    /// Load configuration from environment variables
    ///
    /// A missing `AIPIPE_TOKEN` is not an error here: calls made without it
    /// fail and fall back.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("AIPIPE_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            token: std::env::var("AIPIPE_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            model: std::env::var("REPOPILOT_MODEL")
                .unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
            temperature: Self::TEMPERATURE,
            max_tokens: Self::MAX_TOKENS,
            timeout: Self::TIMEOUT,
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }
}

/// Why a completion call produced no usable text
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("AIPIPE_TOKEN environment variable not set")]
    MissingCredential,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    Malformed(String),

    #[error("Completion response has no message content")]
    MissingContent,
}

/// A text-completion service.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Send one system and one user message, returning the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Malformed(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(CompletionError::MissingContent)
}

/// OpenAI-compatible chat-completions client for AI Pipe
#[derive(Debug, Clone)]
pub struct AiPipeClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl AiPipeClient {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn token(&self) -> Result<&str, CompletionError> {
        self.config
            .token
            .as_deref()
            .ok_or(CompletionError::MissingCredential)
    }

    /// List model ids offered by the service.
    pub async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
        let response = self
            .http
            .get(self.url("models"))
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let models: ModelList =
            serde_json::from_str(&body).map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl CompletionApi for AiPipeClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(self.token()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_content(&text)
    }
}

/// Scripted completion service used by tests.
#[cfg(test)]
pub(crate) struct FakeCompletion {
    reply: Result<String, CompletionError>,
    pub prompts: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Default::default(),
        }
    }

    pub fn failing(err: CompletionError) -> Self {
        Self {
            reply: Err(err),
            prompts: Default::default(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl CompletionApi for FakeCompletion {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.reply.clone()
    }
}
