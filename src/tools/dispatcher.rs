// file: src/tools/dispatcher.rs
// description: routes tool calls to preference mutators, profile and recommendations
// reference: load, apply, persist, wrap

use crate::config::Config;
use crate::error::Result;
use crate::models::{PreferenceRecord, UserIdentity};
use crate::preferences::{self, preferred_name, render_profile};
use crate::recommend::Recommender;
use crate::store::{FileKvStore, MutationOutcome, PreferenceStore};
use crate::tools::schema::{ToolCall, ToolResponse};
use crate::utils::{HealthCheck, HealthReport, OperationTimer};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SLOW_TOOL_THRESHOLD: Duration = Duration::from_secs(5);

/// Executes tool calls for a given identity. Holds no per-call state; everything
/// persistent lives in the [`PreferenceStore`].
pub struct Dispatcher {
    store: PreferenceStore,
    recommender: Recommender,
}

impl Dispatcher {
    pub fn new(store: PreferenceStore, recommender: Recommender) -> Self {
        Self { store, recommender }
    }

    /// File-backed store under `storage.data_dir` plus the configured inference client.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let kv = FileKvStore::new(config.storage.data_dir.clone()).await?;
        info!("Preference records stored in {}", kv.data_dir().display());

        let store = PreferenceStore::new(Arc::new(kv));
        let recommender = Recommender::from_config(&config.inference)?;
        Ok(Self::new(store, recommender))
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub async fn health(&self) -> HealthReport {
        let start = Instant::now();
        let storage = match self.store.ping().await {
            Ok(()) => HealthCheck::healthy(self.store.backend_name(), start.elapsed()),
            Err(e) => {
                HealthCheck::unhealthy(self.store.backend_name(), e.to_string(), start.elapsed())
            }
        };

        let inference = if self.recommender.is_configured() {
            HealthCheck::healthy(self.recommender.model_name(), Duration::ZERO)
        } else {
            HealthCheck::degraded(
                "inference",
                "no API key configured; recommendations return an apology".to_string(),
                Duration::ZERO,
            )
        };

        HealthReport::new(
            vec![storage, inference],
            env!("CARGO_PKG_VERSION").to_string(),
        )
    }

    /// Record the session's display name when the identity provider supplies a new one.
    ///
    /// A failed refresh is logged and skipped: the session still runs, reads degrade to
    /// an empty record and only tool mutations report storage errors.
    pub async fn init_session(&self, identity: &UserIdentity) {
        let name = identity.display_name.trim().to_string();
        let key = identity.storage_key();

        if name.is_empty() {
            self.store.load(&key).await;
            return;
        }

        let result = self
            .store
            .mutate(&key, move |record| {
                if record.display_name == name {
                    MutationOutcome::unchanged(String::new())
                } else {
                    let mut updated = record.clone();
                    updated.display_name = name;
                    MutationOutcome::updated(updated, String::new())
                }
            })
            .await;

        match result {
            Ok(outcome) if outcome.is_mutation() => {
                info!("Updated display name for {}", identity.user_id)
            }
            Ok(_) => {}
            Err(e) => warn!(
                "Could not refresh display name for {}: {}",
                identity.user_id, e
            ),
        }
    }

    /// Look a tool up by wire name, decode its arguments and run it.
    pub async fn invoke(
        &self,
        identity: &UserIdentity,
        name: &str,
        arguments: Value,
    ) -> Result<ToolResponse> {
        let call = ToolCall::parse(name, arguments)?;
        self.dispatch(identity, call).await
    }

    pub async fn dispatch(&self, identity: &UserIdentity, call: ToolCall) -> Result<ToolResponse> {
        call.validate()?;

        let tool = call.name();
        let timer = OperationTimer::new(tool.as_str());
        let key = identity.storage_key();
        debug!("Dispatching {} for {}", tool, identity.user_id);

        let text = match call {
            ToolCall::GetProfile => {
                let record = self.store.load(&key).await;
                render_profile(&record, identity)
            }
            ToolCall::AddGenre(p) => {
                self.apply(&key, move |r| preferences::add_genre(r, &p.genre))
                    .await?
            }
            ToolCall::AddFavoriteAuthor(p) => {
                self.apply(&key, move |r| preferences::add_favorite_author(r, &p.author))
                    .await?
            }
            ToolCall::AddBookRead(p) => {
                let now = Utc::now();
                self.apply(&key, move |r| {
                    preferences::add_book_read(r, &p.title, &p.author, now)
                })
                .await?
            }
            ToolCall::AddDislikedBook(p) => {
                let now = Utc::now();
                self.apply(&key, move |r| {
                    preferences::add_disliked_book(r, &p.title, &p.author, now)
                })
                .await?
            }
            ToolCall::AddDislikedAuthor(p) => {
                self.apply(&key, move |r| preferences::add_disliked_author(r, &p.author))
                    .await?
            }
            ToolCall::ClearPreferences => {
                self.apply(&key, preferences::clear_preferences).await?
            }
            ToolCall::GetBookRecommendations => {
                let record = self.store.load(&key).await;
                let name = preferred_name(&record, identity).to_string();
                self.recommender.recommend(&record, &name).await
            }
        };

        timer.warn_if_slow(SLOW_TOOL_THRESHOLD);
        timer.finish();
        Ok(ToolResponse::text(text))
    }

    async fn apply<F>(&self, key: &str, mutator: F) -> Result<String>
    where
        F: FnOnce(&PreferenceRecord) -> MutationOutcome + Send + 'static,
    {
        let outcome = self.store.mutate(key, mutator).await?;
        Ok(outcome.message)
    }
}
