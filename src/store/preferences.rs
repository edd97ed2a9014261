// file: src/store/preferences.rs
// description: per-user preference record store with serialized read-modify-write
// reference: https://docs.rs/tokio/latest/tokio/sync/struct.Mutex.html

use crate::error::{BookshelfError, Result};
use crate::models::PreferenceRecord;
use crate::store::kv::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result of applying a mutator to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// `None` when the call was a no-op (e.g. a duplicate add).
    pub record: Option<PreferenceRecord>,
    pub message: String,
}

impl MutationOutcome {
    pub fn unchanged(message: String) -> Self {
        Self {
            record: None,
            message,
        }
    }

    pub fn updated(record: PreferenceRecord, message: String) -> Self {
        Self {
            record: Some(record),
            message,
        }
    }

    pub fn is_mutation(&self) -> bool {
        self.record.is_some()
    }
}

/// One user's owning context. Only lives in the owner map while some call holds it.
type Owner = Arc<Mutex<()>>;

/// Owns every user's preference record.
///
/// All access to a user's record goes through that user's [`Owner`], so concurrent calls
/// for the same user queue instead of interleaving their read-modify-write windows.
/// Different users never share an owner.
///
/// The record is read from the backing store under the owner lock on every call and
/// written through on every mutation. Nothing outlives the call, so a change made by
/// another process on the same store (a CLI `purge` next to a running server) is seen
/// by the very next call.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    kv: Arc<dyn KeyValueStore>,
    owners: std::sync::Mutex<HashMap<String, Owner>>,
}

/// A claim on a user's owner. Dropping the last claim removes the owner from the map.
struct OwnerLease<'a> {
    inner: &'a StoreInner,
    key: &'a str,
    owner: Owner,
}

impl OwnerLease<'_> {
    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.owner.lock().await
    }
}

impl Drop for OwnerLease<'_> {
    fn drop(&mut self) {
        // new claims are only taken under the map lock, so the count cannot race
        let mut owners = self.inner.owners();
        if Arc::strong_count(&self.owner) == 2 {
            owners.remove(self.key);
        }
    }
}

impl PreferenceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                kv,
                owners: std::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.kv.backend_name()
    }

    /// Number of users with a call in flight.
    pub fn active_owners(&self) -> usize {
        self.inner.owners().len()
    }

    /// Load a user's record, creating and persisting an empty one on first access.
    ///
    /// Never fails: when storage is unavailable a transient empty record is returned.
    pub async fn load(&self, user_key: &str) -> PreferenceRecord {
        let lease = self.inner.lease(user_key);
        let _guard = lease.lock().await;

        match self.inner.fetch(user_key).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Preference storage unavailable for {}, serving empty record: {}",
                    user_key, e
                );
                PreferenceRecord::default()
            }
        }
    }

    /// Replace a user's whole record.
    pub async fn save(&self, user_key: &str, record: &PreferenceRecord) -> Result<()> {
        let lease = self.inner.lease(user_key);
        let _guard = lease.lock().await;

        self.inner.write(user_key, record).await
    }

    /// Run `mutator` against the current record and persist its result.
    ///
    /// The read-modify-write runs on its own task: if the caller is dropped mid-way the
    /// write still completes. A mutation is refused when the current record cannot be
    /// read, so an unreadable record is never overwritten.
    pub async fn mutate<F>(&self, user_key: &str, mutator: F) -> Result<MutationOutcome>
    where
        F: FnOnce(&PreferenceRecord) -> MutationOutcome + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let key = user_key.to_string();

        tokio::spawn(async move {
            let lease = inner.lease(&key);
            let _guard = lease.lock().await;

            let current = inner.fetch(&key).await.map_err(|e| {
                BookshelfError::Storage(format!("Cannot update preferences for {}: {}", key, e))
            })?;

            let outcome = mutator(&current);
            if let Some(updated) = &outcome.record {
                inner.write(&key, updated).await?;
                debug!("Persisted preference update for {}", key);
            }

            Ok(outcome)
        })
        .await
        .map_err(|e| BookshelfError::Storage(format!("Preference update task failed: {}", e)))?
    }

    /// Delete a user's record entirely. Not reachable from the tool surface.
    pub async fn purge(&self, user_key: &str) -> Result<bool> {
        let lease = self.inner.lease(user_key);
        let _guard = lease.lock().await;

        let existed = self.inner.kv.delete(user_key).await?;
        info!("Purged preference record for {} (existed: {})", user_key, existed);
        Ok(existed)
    }

    /// Read a sentinel key to check the backing store responds.
    pub async fn ping(&self) -> Result<()> {
        self.inner.kv.get("health:ping").await.map(|_| ())
    }
}

impl StoreInner {
    fn owners(&self) -> std::sync::MutexGuard<'_, HashMap<String, Owner>> {
        self.owners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lease<'a>(&'a self, user_key: &'a str) -> OwnerLease<'a> {
        let owner = Arc::clone(self.owners().entry(user_key.to_string()).or_default());
        OwnerLease {
            inner: self,
            key: user_key,
            owner,
        }
    }

    async fn fetch(&self, user_key: &str) -> Result<PreferenceRecord> {
        match self.kv.get(user_key).await? {
            Some(raw) => serde_json::from_str::<PreferenceRecord>(&raw).map_err(|e| {
                BookshelfError::Storage(format!(
                    "Stored preference record for {} is unreadable: {}",
                    user_key, e
                ))
            }),
            None => {
                let record = PreferenceRecord::default();
                self.write(user_key, &record).await?;
                info!("Created preference record for {}", user_key);
                Ok(record)
            }
        }
    }

    async fn write(&self, user_key: &str, record: &PreferenceRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.kv.put(user_key, &raw).await
    }
}
