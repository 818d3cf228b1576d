//! No-op memory store — disables long-term memory entirely.

use async_trait::async_trait;
use nova_core::{MemoryEntry, MemoryError, MemoryStore};

/// A store that remembers nothing. Used when memory is disabled in config
/// or when the file-backed store cannot be opened.
pub struct NoopStore;

#[async_trait]
impl MemoryStore for NoopStore {
    fn name(&self) -> &str {
        "none"
    }

    async fn add(&self, _content: &str, _tags: Vec<String>) -> Result<String, MemoryError> {
        Ok(String::new())
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        Ok(Vec::new())
    }

    async fn all(&self, _limit: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: &str) -> Result<bool, MemoryError> {
        Ok(false)
    }

    async fn delete_all(&self) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(0)
    }
}
