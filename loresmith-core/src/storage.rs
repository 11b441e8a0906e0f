//! Durable document persistence.
//!
//! Each logical collection (campaigns, narrators, chat logs, scene states)
//! is one JSON document, keyed by name, under a single root directory.
//! Loads are forgiving: a missing or corrupt document is logged and
//! replaced by the caller-supplied default, never raised. Saves write the
//! whole document and are awaited before the operation returns, so readers
//! observe the new value immediately after a write completes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Document key for the campaign list.
pub const CAMPAIGNS_KEY: &str = "campaigns";

/// Document key for the narrator registry.
pub const NARRATORS_KEY: &str = "narrators";

/// Document key for the active narrator id scalar.
pub const ACTIVE_NARRATOR_KEY: &str = "active_narrator";

/// Document key for the per-session chat logs.
pub const CHAT_LOGS_KEY: &str = "chat_logs";

/// Document key for the per-session scene states.
pub const SCENE_STATES_KEY: &str = "scene_states";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A directory of JSON documents, one file per logical key.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open a document store rooted at the given directory, creating the
    /// directory if it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Load the document stored under `key`, or the supplied default.
    ///
    /// A document that is missing, unreadable, or fails to parse is not
    /// fatal: the condition is logged and `default` is returned. Callers
    /// that need to distinguish "not yet attempted" from "attempted and
    /// defaulted" record their own loaded flag once this returns.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key, "no persisted document, using default");
                return default;
            }
            Err(err) => {
                tracing::warn!(key, %err, "failed to read persisted document, using default");
                return default;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "failed to parse persisted document, using default");
                default
            }
        }
    }

    /// Serialize `value` and write it as the full document under `key`.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.path_for(key), content).await?;
        Ok(())
    }

    /// Delete the document stored under `key`. Missing files are fine.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        timestamp: DateTime<Utc>,
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        let notes = vec![Note {
            text: "the vale stirs".to_string(),
            timestamp: Utc::now(),
        }];

        store.save("notes", &notes).await.unwrap();
        let loaded: Vec<Note> = store.load("notes", Vec::new()).await;

        assert_eq!(loaded, notes);
    }

    #[tokio::test]
    async fn test_timestamps_rehydrate_from_iso_strings() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        let note = Note {
            text: "restarted".to_string(),
            timestamp: Utc::now(),
        };
        store.save("note", &note).await.unwrap();

        // On disk the timestamp is an ISO-8601 string, even nested.
        let raw = std::fs::read_to_string(store.root().join("note.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["timestamp"].is_string());

        // Loading turns it back into a typed date-time of equal value.
        let loaded: Option<Note> = store.load("note", None).await;
        assert_eq!(loaded.unwrap().timestamp, note.timestamp);
    }

    #[tokio::test]
    async fn test_missing_document_yields_default() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        let loaded: Vec<Note> = store.load("absent", Vec::new()).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_yields_default() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        std::fs::write(store.root().join("broken.json"), "{not json at all").unwrap();

        let loaded: Vec<Note> = store.load("broken", Vec::new()).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_document() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        store.save("counts", &vec![1, 2, 3]).await.unwrap();
        store.save("counts", &vec![9]).await.unwrap();

        let loaded: Vec<i32> = store.load("counts", Vec::new()).await;
        assert_eq!(loaded, vec![9]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path()).await.unwrap();

        store.save("doomed", &"x").await.unwrap();
        store.remove("doomed").await.unwrap();
        store.remove("doomed").await.unwrap();

        let loaded: Option<String> = store.load("doomed", None).await;
        assert!(loaded.is_none());
    }
}
