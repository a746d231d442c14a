//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{KeyValueStore, StorageError};

/// Process-local store for development and testing. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        debug!(key, "memory store: set");
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            debug!(key, "memory store: delete");
        }
        Ok(())
    }
}
