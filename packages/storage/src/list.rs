//! Durable ordered lists of records, one JSON array document per list.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Storage, StorageError};

/// Result of loading a list.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedList<T> {
    /// Records in stored order. Empty when the document was reset.
    pub items: Vec<T>,
    /// Why the stored document was replaced by an empty one, if it was.
    pub reset: Option<String>,
}

/// Loads and saves named lists of records.
///
/// A missing, blank or unparseable document is treated as an empty list and
/// rewritten as `[]`, so the coordinator heals instead of failing closed.
/// There is no coordination between concurrent writers at this layer.
#[derive(Debug, Clone)]
pub struct ListStore {
    storage: Storage,
}

impl ListStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load the list stored under `key`, healing it if necessary.
    ///
    /// Only fails when the healing write itself fails.
    pub async fn load<T: DeserializeOwned + Serialize>(&self, key: &str) -> Result<LoadedList<T>, StorageError> {
        let reason = match self.storage.get_bytes(key).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => "document is empty".to_string(),
            Ok(bytes) => match serde_json::from_slice::<Vec<T>>(&bytes) {
                Ok(items) => return Ok(LoadedList { items, reset: None }),
                Err(e) => format!("document is not a list of records: {e}"),
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(key, "list document missing, creating it");
                self.save::<T>(key, &[]).await?;
                return Ok(LoadedList {
                    items: Vec::new(),
                    reset: None,
                });
            }
            Err(e) => format!("read failed: {e}"),
        };

        tracing::warn!(key, %reason, "resetting list document");
        self.save::<T>(key, &[]).await?;
        Ok(LoadedList {
            items: Vec::new(),
            reset: Some(reason),
        })
    }

    /// Replace the list stored under `key` with `items`.
    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(items)?;
        self.storage.put_bytes(key, Bytes::from(json)).await?;
        tracing::debug!(key, len = items.len(), "saved list");
        Ok(())
    }
}
