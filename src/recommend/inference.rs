// file: src/recommend/inference.rs
// description: chat-completions client for the text-generation endpoint
// reference: https://console.groq.com/docs/api-reference#chat

use crate::config::InferenceConfig;
use crate::error::{BookshelfError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A text-generation endpoint. Treated as slow and unreliable.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client (Groq by default).
pub struct GroqChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqChatClient {
    pub fn new(config: &InferenceConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BookshelfError::Inference(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn extract_text(response: ChatResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| BookshelfError::Inference("Model returned no text".to_string()))
    }
}

#[async_trait]
impl InferenceClient for GroqChatClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Requesting completion from {} for {} prompt chars",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                BookshelfError::Inference(format!("Failed to send completion request: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BookshelfError::Inference(format!(
                "Completion request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            BookshelfError::Inference(format!("Failed to parse completion response: {}", e))
        })?;

        Self::extract_text(chat_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Stand-in used when no API key is configured; every call fails.
pub struct UnconfiguredInference;

impl UnconfiguredInference {
    pub const MODEL_NAME: &'static str = "unconfigured";
}

#[async_trait]
impl InferenceClient for UnconfiguredInference {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(BookshelfError::Inference(
            "No inference API key configured".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }
}
