// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod preferences;
pub mod recommend;
pub mod store;
pub mod tools;
pub mod utils;

pub use config::{Config, IdentityConfig, InferenceConfig, ServerConfig, StorageConfig};
pub use error::{BookshelfError, Result};
pub use mcp::BookshelfMcp;
pub use models::{BookEntry, Facet, PreferenceRecord, UserIdentity};
pub use recommend::{GroqChatClient, InferenceClient, PromptBuilder, Recommender};
pub use store::{FileKvStore, KeyValueStore, MemoryKvStore, PreferenceStore};
pub use tools::{Dispatcher, ToolCall, ToolName, ToolResponse, ToolSpec, registry};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
