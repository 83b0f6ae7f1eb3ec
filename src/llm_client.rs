use crate::circuit_breaker::{create_llm_circuit_breaker, LlmCircuitBreaker};
use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const SCORE_TEMPERATURE: f32 = 0.3;
pub const GENERATE_TEMPERATURE: f32 = 0.5;

/// Text-in/text-out language model boundary.
///
/// Both calls are single-attempt and must be assumed to fail, time out or
/// return malformed text. Callers own the fallback policy.
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Asks for a numeric judgment of `context` under `policy`. Returns the raw reply.
    async fn score(&self, context: &str, policy: &str) -> Result<String, AppError>;

    /// Asks for free text about `context` under `policy`. Returns the raw reply.
    async fn generate(&self, context: &str, policy: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the xAI chat completions API (OpenAI-compatible).
pub struct XaiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    breaker: LlmCircuitBreaker,
}

impl XaiClient {
    /// Creates a new `XaiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.x.ai/v1`.
    /// * `api_key` - Bearer token.
    /// * `model` - Model identifier sent with every request.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create xAI client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            breaker: create_llm_circuit_breaker(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.xai_base_url.clone(),
            config.xai_api_key.clone(),
            config.xai_model.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    /// Sends one chat completion through the circuit breaker.
    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, AppError> {
        match self.breaker.call(self.send_chat(system, user, temperature)).await {
            Ok(content) => Ok(content),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("xAI circuit breaker open, rejecting call");
                Err(AppError::ExternalApiError(
                    "xAI circuit breaker is open".to_string(),
                ))
            }
        }
    }

    async fn send_chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Calling xAI model {} at {}", self.model, url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("xAI returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "xAI returned status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::Format(format!("Failed to parse xAI response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Format("Empty sample returned from chat".to_string()))?
            .message
            .content
            .ok_or_else(|| AppError::Format("Response does not contain content".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextCompletionProvider for XaiClient {
    async fn score(&self, context: &str, policy: &str) -> Result<String, AppError> {
        self.chat(policy, context, SCORE_TEMPERATURE).await
    }

    async fn generate(&self, context: &str, policy: &str) -> Result<String, AppError> {
        self.chat(policy, context, GENERATE_TEMPERATURE).await
    }
}
