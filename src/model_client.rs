use crate::errors::AppError;
use crate::retry::{retry_async, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One text-completion request per call, no retries.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Option<String>, AppError>;
}

// ============ OpenAI-compatible backend ============

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiCompatBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatBackend {
    /// `client` is shared with the rest of the run so connections are pooled.
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatBackend {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Option<String>, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        };

        tracing::debug!(model = %self.model, max_tokens, "Model completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse model response: {}", e))
        })?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

// ============ Query client ============

/// Retrying front for a [`CompletionBackend`].
///
/// Every failure is retried under the policy; once attempts run out the last
/// error is returned so callers can choose their own fallback.
#[derive(Clone)]
pub struct ModelQueryClient {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl ModelQueryClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the trimmed completion, or `None` when the model answered with
    /// nothing but whitespace.
    pub async fn ask(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Option<String>, AppError> {
        let content = retry_async(
            &self.retry,
            "model_completion",
            |_: &AppError| true,
            |_| self.backend.complete(prompt, max_tokens, temperature),
        )
        .await?;

        Ok(content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}
