// file: src/store/file.rs
// description: file-backed key-value store, one JSON document per key
// reference: https://docs.rs/tokio/latest/tokio/fs

use crate::error::{BookshelfError, Result};
use crate::store::kv::KeyValueStore;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Stores each value in `<data_dir>/<sha256(key)>.json`.
///
/// Keys are hashed so arbitrary user ids map to safe, collision-free file names.
/// Writes go to a temporary file first and are renamed into place, so readers see
/// either the old or the new document.
pub struct FileKvStore {
    data_dir: PathBuf,
}

impl FileKvStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir).await.map_err(|e| {
            BookshelfError::Storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.data_dir.join(format!("{:x}.json", hasher.finalize()))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value for {} at {:?}", key, path);
                Ok(None)
            }
            Err(e) => Err(BookshelfError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value).await.map_err(|e| {
            BookshelfError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &path).await.map_err(|e| {
            BookshelfError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Saved {} bytes for {}", value.len(), key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BookshelfError::Storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_persistence() {
        let dir = tempdir().unwrap();

        {
            let store = FileKvStore::new(dir.path().join("prefs")).await.unwrap();
            store.put("user:alice", r#"{"displayName":"Alice"}"#).await.unwrap();
        }

        let store = FileKvStore::new(dir.path().join("prefs")).await.unwrap();
        assert_eq!(
            store.get("user:alice").await.unwrap().as_deref(),
            Some(r#"{"displayName":"Alice"}"#)
        );
        assert_eq!(store.get("user:bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_map_to_distinct_files() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path().to_path_buf()).await.unwrap();

        assert_ne!(store.path_for("user:a/../b"), store.path_for("user:b"));
        assert!(store.path_for("user:../../etc").starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path().to_path_buf()).await.unwrap();
        store.put("user:a", "{}").await.unwrap();
        store.put("user:a", "{\"displayName\":\"A\"}").await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path().to_path_buf()).await.unwrap();
        store.put("user:a", "{}").await.unwrap();
        assert!(store.delete("user:a").await.unwrap());
        assert!(!store.delete("user:a").await.unwrap());
        assert_eq!(store.get("user:a").await.unwrap(), None);
    }
}
