// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{BookshelfError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub inference: InferenceConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub transport: String,
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Identity used when no identity provider sits in front of the server (stdio mode).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

fn default_temperature() -> f32 {
    0.7
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BOOKSHELF")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| BookshelfError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| BookshelfError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                transport: "stdio".to_string(),
                bind_addr: "127.0.0.1:8787".to_string(),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data/preferences"),
            },
            inference: InferenceConfig {
                endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
                api_key: None,
                max_tokens: 1024,
                timeout_secs: 30,
                temperature: default_temperature(),
            },
            identity: IdentityConfig {
                user_id: "local".to_string(),
                display_name: String::new(),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.inference.max_tokens == 0 {
            return Err(BookshelfError::Config(
                "inference.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.inference.timeout_secs == 0 {
            return Err(BookshelfError::Config(
                "inference.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.identity.user_id.trim().is_empty() {
            return Err(BookshelfError::Config(
                "identity.user_id must not be empty".to_string(),
            ));
        }

        Validator::validate_url(&self.inference.endpoint)
            .map_err(|e| BookshelfError::Config(format!("inference.endpoint: {}", e)))?;

        Ok(())
    }
}
