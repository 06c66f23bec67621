//! Chat-completion client for the course assistant.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::AssistantSettings;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service is rate limiting requests")]
    RateLimited,
    #[error("completion service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned no content")]
    EmptyResponse,
}

impl CompletionError {
    /// Only rate limiting is worth waiting for; everything else switches to local answers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CompletionError::RateLimited)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Calls a chat-completion endpoint with a bearer token supplied at runtime.
pub struct HttpCompletion {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpCompletion {
    pub fn new(settings: &AssistantSettings) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: CompletionResponse = response.json().await?;
        extract_content(parsed)
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_content(response: CompletionResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(CompletionError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> CompletionError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return CompletionError::RateLimited;
    }
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());
    CompletionError::Status {
        status: status.as_u16(),
        message,
    }
}
