// file: src/recommend/mod.rs
// description: book recommendations from accumulated preferences
// reference: internal module structure

pub mod inference;
pub mod prompt;

pub use inference::{GroqChatClient, InferenceClient, UnconfiguredInference};
pub use prompt::{APOLOGY, PromptBuilder};

use crate::config::InferenceConfig;
use crate::error::Result;
use crate::models::PreferenceRecord;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Recommender {
    client: Arc<dyn InferenceClient>,
    max_tokens: u32,
    configured: bool,
}

impl Recommender {
    pub fn new(client: Arc<dyn InferenceClient>, max_tokens: u32) -> Self {
        Self {
            client,
            max_tokens,
            configured: true,
        }
    }

    /// Every request answers with the apology text.
    pub fn unconfigured(max_tokens: u32) -> Self {
        Self {
            client: Arc::new(UnconfiguredInference),
            max_tokens,
            configured: false,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                info!("Using inference model {} at {}", config.model, config.endpoint);
                let client = GroqChatClient::new(config, key.trim().to_string())?;
                Ok(Self::new(Arc::new(client), config.max_tokens))
            }
            _ => {
                warn!("No inference API key configured; recommendations will be unavailable");
                Ok(Self::unconfigured(config.max_tokens))
            }
        }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Never fails: inference errors are logged and turned into the apology text.
    pub async fn recommend(&self, record: &PreferenceRecord, name: &str) -> String {
        let prompt = PromptBuilder::build(record, name);

        match self.client.complete(&prompt, self.max_tokens).await {
            Ok(text) => PromptBuilder::shape_response(record, name, Some(&text)),
            Err(e) => {
                warn!("Recommendation request failed: {}", e);
                PromptBuilder::shape_response(record, name, None)
            }
        }
    }
}
