use newsdesk_core::{CoreError, LlmError, OpenAiCredentials};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const PROVIDER: &str = "openai";

/// Produces text from a system prompt and a single user message.
pub trait TextGenerator {
    async fn generate(&self, system_prompt: &str, user_message: &str)
        -> Result<String, CoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI or any compatible endpoint.
pub struct OpenAiProvider {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Result<Self, CoreError> {
        Self::with_base_url(api_key, OPENAI_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn from_credentials(credentials: &OpenAiCredentials) -> Result<Self, CoreError> {
        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_API_BASE.to_string());
        Self::with_base_url(credentials.api_key.clone(), base_url)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, system_prompt: &str, user_message: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
            temperature: self.temperature,
        }
    }

    fn status_error(&self, status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
        let provider = PROVIDER.to_string();
        match status {
            StatusCode::UNAUTHORIZED => LlmError::InvalidApiKey { provider },
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded {
                provider,
                retry_after,
            },
            StatusCode::NOT_FOUND => LlmError::ModelNotAvailable {
                model: self.model.clone(),
            },
            s if s.is_server_error() => LlmError::ServiceUnavailable { provider },
            s => LlmError::InvalidRequest {
                provider,
                reason: format!("{} - {}", s, body),
            },
        }
    }
}

impl TextGenerator for OpenAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(system_prompt, user_message);

        debug!(
            "Requesting completion from {} ({} chars of input)",
            self.model,
            user_message.len()
        );
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            error!("Completion request failed: {} - {}", status, text);
            return Err(self.status_error(status, retry_after, &text).into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            })
        })?;

        let content = extract_content(completion)?;
        info!("🤖 Received {} chars from {}", content.len(), self.model);
        Ok(content)
    }
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String, CoreError> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(LlmError::EmptyCompletion {
            provider: PROVIDER.to_string(),
        }
        .into());
    }
    Ok(content)
}
