use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::StorageError;

/// Narrow key-value storage port.
///
/// The session manager owns its slot exclusively; nothing else should write
/// to the session key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;
